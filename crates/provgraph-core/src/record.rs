//! Record shapes flowing through the pipeline.
//!
//! Adapters reduce their wire formats to [`NodeRecord`] and
//! [`EdgeCandidate`]; the normalizer turns candidates into
//! [`NormalizedEdge`]s; the ordering pass turns those into
//! [`CanonicalEdge`]s, the output unit.

use serde::{Deserialize, Serialize};

/// A node as extracted by a format adapter.
///
/// `original_id` is the source's own identifier (a UUID, a numeric string).
/// It is unique within one input source; re-registration is governed by
/// [`crate::index::DuplicatePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub original_id: String,
    pub node_type: String,
    /// Additional descriptive attributes, already ordered for hashing.
    /// Absent optional fields appear as the `"N/A"` sentinel.
    pub extra_attributes: Vec<String>,
}

impl NodeRecord {
    pub fn new(original_id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            original_id: original_id.into(),
            node_type: node_type.into(),
            extra_attributes: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attrs: Vec<String>) -> Self {
        self.extra_attributes = attrs;
        self
    }

    /// Fingerprint parts: type first, then the extra attributes.
    pub fn fingerprint_parts(&self) -> Vec<String> {
        let mut parts = Vec::with_capacity(1 + self.extra_attributes.len());
        parts.push(self.node_type.clone());
        parts.extend(self.extra_attributes.iter().cloned());
        parts
    }
}

/// An edge-shaped record before role resolution.
///
/// Endpoint references are carried under their source-format roles
/// (subject / object1 / object2); the role table decides which pair becomes
/// source and destination, and in which order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCandidate {
    /// Symbolic event name used for the role-table lookup.
    pub role_key: String,
    /// Type string entering the edge fingerprint (usually equal to
    /// `role_key`, but CamFlow keys roles by relation kind and types edges
    /// by `prov:type`).
    pub edge_type: String,
    /// Optional flag attributes for the edge fingerprint.
    pub flags: Vec<String>,
    pub subject: Option<String>,
    pub object1: Option<String>,
    pub object2: Option<String>,
    pub logical_timestamp: u64,
}

/// A fully fingerprinted edge, pre-canonicalization.
///
/// Endpoints are still original references: canonical integer IDs and
/// novelty flags are only assigned once the final edge order is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEdge {
    pub source_ref: String,
    pub dest_ref: String,
    pub source_fingerprint: u64,
    pub dest_fingerprint: u64,
    pub edge_fingerprint: u64,
    pub logical_timestamp: u64,
}

/// The output unit: one directed edge in the canonical ID space.
///
/// `source_is_new` is true iff this edge is the first in the whole ordered
/// sequence to reference `source_id` (in either role); likewise
/// `dest_is_new`. The flags are captured while walking the final sequence,
/// never recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEdge {
    pub source_id: u64,
    pub dest_id: u64,
    pub source_fingerprint: u64,
    pub dest_fingerprint: u64,
    pub edge_fingerprint: u64,
    pub logical_timestamp: u64,
    pub source_is_new: bool,
    pub dest_is_new: bool,
}
