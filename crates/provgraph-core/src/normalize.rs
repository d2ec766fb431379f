//! Edge normalization.
//!
//! Turns role-tagged edge candidates into fingerprinted, directed
//! [`NormalizedEdge`]s: resolve the role rule for the event type, pick the
//! endpoint pair, look up endpoint fingerprints, fingerprint the edge type
//! and flags, and emit — twice with endpoints swapped for symmetric events.
//!
//! Every drop is counted under exactly one reason. An unknown event type is
//! logged at error level: unlike the other drops it points at a
//! schema-coverage gap in the adapter's table rather than at dirty input.

use tracing::{debug, error};

use crate::counters::Counters;
use crate::error::Result;
use crate::fingerprint::{Fingerprinter, ABSENT};
use crate::index::NodeIndex;
use crate::record::{EdgeCandidate, NormalizedEdge};
use crate::roles::{Direction, RoleTable};

/// Table-driven normalizer with drop accounting.
pub struct EdgeNormalizer {
    table: RoleTable,
    pub counters: Counters,
}

impl EdgeNormalizer {
    pub fn new(table: RoleTable) -> Self {
        Self {
            table,
            counters: Counters::default(),
        }
    }

    /// Account for an edge-shaped record the adapter could not even shape
    /// into a candidate (missing type or timestamp).
    pub fn drop_malformed(&mut self, context: &str) {
        self.counters.candidate_edges += 1;
        self.counters.dropped_malformed += 1;
        debug!(context, "edge record missing a required field");
    }

    /// Normalize one candidate into zero, one, or two edges.
    pub fn normalize(
        &mut self,
        candidate: &EdgeCandidate,
        index: &NodeIndex,
        fingerprinter: &mut Fingerprinter,
    ) -> Result<Vec<NormalizedEdge>> {
        self.counters.candidate_edges += 1;

        let Some(rule) = self.table.rule(&candidate.role_key) else {
            self.counters.dropped_unknown_type += 1;
            error!(event_type = %candidate.role_key, "event type missing from role table");
            return Ok(Vec::new());
        };

        let (source_ref, dest_ref) = match rule.direction {
            Direction::SubjectToObject => (&candidate.subject, &candidate.object1),
            Direction::ObjectToSubject => (&candidate.object1, &candidate.subject),
            Direction::ObjectToObject2 => (&candidate.object1, &candidate.object2),
            Direction::Undirected => {
                self.counters.dropped_undirected += 1;
                debug!(event_type = %candidate.role_key, "undirected event type, edge dropped");
                return Ok(Vec::new());
            }
        };
        let (Some(source_ref), Some(dest_ref)) = (source_ref, dest_ref) else {
            self.counters.dropped_malformed += 1;
            debug!(event_type = %candidate.role_key, "edge record missing an endpoint reference");
            return Ok(Vec::new());
        };

        let Some(source_fingerprint) = index.fingerprint_of(source_ref)? else {
            self.counters.dropped_unresolved += 1;
            debug!(event_type = %candidate.role_key, reference = %source_ref, "unregistered source node");
            return Ok(Vec::new());
        };
        let Some(dest_fingerprint) = index.fingerprint_of(dest_ref)? else {
            self.counters.dropped_unresolved += 1;
            debug!(event_type = %candidate.role_key, reference = %dest_ref, "unregistered destination node");
            return Ok(Vec::new());
        };

        let mut parts = Vec::with_capacity(1 + candidate.flags.len().max(1));
        parts.push(candidate.edge_type.clone());
        if candidate.flags.is_empty() {
            parts.push(ABSENT.to_string());
        } else {
            parts.extend(candidate.flags.iter().cloned());
        }
        let edge_fingerprint = fingerprinter.digest(&parts)?;

        let forward = NormalizedEdge {
            source_ref: source_ref.clone(),
            dest_ref: dest_ref.clone(),
            source_fingerprint,
            dest_fingerprint,
            edge_fingerprint,
            logical_timestamp: candidate.logical_timestamp,
        };
        let mut edges = Vec::with_capacity(if rule.bidirectional { 2 } else { 1 });
        if rule.bidirectional {
            let reverse = NormalizedEdge {
                source_ref: forward.dest_ref.clone(),
                dest_ref: forward.source_ref.clone(),
                source_fingerprint: dest_fingerprint,
                dest_fingerprint: source_fingerprint,
                edge_fingerprint,
                logical_timestamp: candidate.logical_timestamp,
            };
            edges.push(forward);
            edges.push(reverse);
        } else {
            edges.push(forward);
        }

        self.counters.valid_edges += 1;
        self.counters.emitted_edges += edges.len() as u64;
        Ok(edges)
    }
}
