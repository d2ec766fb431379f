//! Edge ordering and canonicalization.
//!
//! Canonical IDs and novelty flags are a property of the *final* edge
//! order, so the log defers both until the order is settled: arrival-order
//! formats could in principle canonicalize on the fly, but sorted formats
//! cannot, and a single walk over the settled sequence covers both. The
//! sort is stable — edges with equal logical timestamps keep their relative
//! input order.

use crate::record::{CanonicalEdge, NormalizedEdge};
use crate::resolver::IdentityResolver;

/// How the final edge sequence is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingMode {
    /// Keep arrival order (formats whose timestamps are non-decreasing).
    #[default]
    Arrival,
    /// Stable-sort by logical timestamp (formats that interleave records
    /// out of timestamp order across lines or files).
    SortByTimestamp,
}

/// Accumulates normalized edges, then canonicalizes them in final order.
#[derive(Debug, Default)]
pub struct EdgeLog {
    mode: OrderingMode,
    edges: Vec<NormalizedEdge>,
}

impl EdgeLog {
    pub fn new(mode: OrderingMode) -> Self {
        Self {
            mode,
            edges: Vec::new(),
        }
    }

    pub fn push(&mut self, edge: NormalizedEdge) {
        self.edges.push(edge);
    }

    pub fn extend(&mut self, edges: impl IntoIterator<Item = NormalizedEdge>) {
        self.edges.extend(edges);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Settle the order and walk it, assigning canonical IDs and capturing
    /// first-reference flags edge by edge.
    ///
    /// The source endpoint resolves before the destination, so a self-loop
    /// on a fresh node marks only the source as new — the destination
    /// reference is already the second sighting.
    pub fn into_canonical(mut self, resolver: &mut IdentityResolver) -> Vec<CanonicalEdge> {
        if self.mode == OrderingMode::SortByTimestamp {
            // Vec::sort_by_key is stable: equal timestamps keep input order.
            self.edges.sort_by_key(|e| e.logical_timestamp);
        }

        self.edges
            .into_iter()
            .map(|edge| {
                let (source, source_is_new) =
                    resolver.resolve_or_create(&edge.source_ref, edge.source_fingerprint);
                let (dest, dest_is_new) =
                    resolver.resolve_or_create(&edge.dest_ref, edge.dest_fingerprint);
                CanonicalEdge {
                    source_id: source.canonical_id,
                    dest_id: dest.canonical_id,
                    source_fingerprint: source.fingerprint,
                    dest_fingerprint: dest.fingerprint,
                    edge_fingerprint: edge.edge_fingerprint,
                    logical_timestamp: edge.logical_timestamp,
                    source_is_new,
                    dest_is_new,
                }
            })
            .collect()
    }
}

/// Summary produced by a scan pass over a source, for formats that need a
/// global minimum timestamp (or a total count) before they can emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub edge_count: u64,
    pub min_timestamp: Option<u64>,
}

impl ScanSummary {
    pub fn observe(&mut self, timestamp: u64) {
        self.edge_count += 1;
        self.min_timestamp = Some(match self.min_timestamp {
            Some(min) => min.min(timestamp),
            None => timestamp,
        });
    }

    /// Offset a wall-clock timestamp against the observed minimum.
    pub fn normalize(&self, timestamp: u64) -> u64 {
        timestamp.saturating_sub(self.min_timestamp.unwrap_or(0))
    }
}
