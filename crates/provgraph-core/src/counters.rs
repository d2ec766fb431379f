//! Drop accounting.
//!
//! Every edge-shaped record an adapter hands to the normalizer is a
//! candidate; it either becomes at least one output edge or is dropped for
//! exactly one reason. The counters reconcile:
//! `valid_edges + dropped_edges() == candidate_edges`, and
//! `emitted_edges == valid_edges + bidirectional duplicates`.

use serde::{Deserialize, Serialize};

/// Per-run record accounting, surfaced in the stats output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Edge-shaped records seen by the normalizer.
    pub candidate_edges: u64,
    /// Candidates that produced output (one per record, even if the record
    /// was bidirectional and emitted twice).
    pub valid_edges: u64,
    /// Edges actually emitted, counting bidirectional duplicates.
    pub emitted_edges: u64,

    /// Dropped: required field missing (type, timestamp, endpoint ref).
    pub dropped_malformed: u64,
    /// Dropped: endpoint reference never registered.
    pub dropped_unresolved: u64,
    /// Dropped: event type absent from the role table (schema-coverage gap).
    pub dropped_unknown_type: u64,
    /// Dropped: event type carries no resolvable direction.
    pub dropped_undirected: u64,

    /// Distinct nodes registered.
    pub nodes_registered: u64,
    /// Node records ignored as re-registrations of a seen ID.
    pub nodes_duplicate: u64,
    /// Node records dropped for a missing type.
    pub nodes_dropped: u64,
}

impl Counters {
    /// Total dropped edge records, all reasons.
    pub fn dropped_edges(&self) -> u64 {
        self.dropped_malformed
            + self.dropped_unresolved
            + self.dropped_unknown_type
            + self.dropped_undirected
    }

    /// Whether the books balance.
    pub fn reconciles(&self) -> bool {
        self.valid_edges + self.dropped_edges() == self.candidate_edges
    }

    /// Fold another run's counters into this one (per-partition runs).
    pub fn absorb(&mut self, other: &Counters) {
        self.candidate_edges += other.candidate_edges;
        self.valid_edges += other.valid_edges;
        self.emitted_edges += other.emitted_edges;
        self.dropped_malformed += other.dropped_malformed;
        self.dropped_unresolved += other.dropped_unresolved;
        self.dropped_unknown_type += other.dropped_unknown_type;
        self.dropped_undirected += other.dropped_undirected;
        self.nodes_registered += other.nodes_registered;
        self.nodes_duplicate += other.nodes_duplicate;
        self.nodes_dropped += other.nodes_dropped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconciliation() {
        let mut c = Counters::default();
        c.candidate_edges = 10;
        c.valid_edges = 7;
        c.dropped_malformed = 1;
        c.dropped_unresolved = 1;
        c.dropped_unknown_type = 1;
        assert!(c.reconciles());
        c.dropped_undirected = 1;
        assert!(!c.reconciles());
    }

    #[test]
    fn absorb_sums_fields() {
        let mut a = Counters {
            candidate_edges: 3,
            valid_edges: 2,
            emitted_edges: 2,
            dropped_malformed: 1,
            ..Counters::default()
        };
        let b = Counters {
            candidate_edges: 5,
            valid_edges: 5,
            emitted_edges: 6,
            ..Counters::default()
        };
        a.absorb(&b);
        assert_eq!(a.candidate_edges, 8);
        assert_eq!(a.valid_edges, 7);
        assert_eq!(a.emitted_edges, 8);
        assert!(a.reconciles());
    }
}
