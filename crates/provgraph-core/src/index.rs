//! Node registration index.
//!
//! The node-parsing phase records every node's attribute fingerprint under
//! its original identifier; the edge phase reads those fingerprints back
//! when it resolves endpoint references. The index sits on the [`KvStore`]
//! capability so that multi-file sources can share registrations through a
//! durable store — in which case every registration pass must complete
//! before any edge pass begins.

use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::store::{KvStore, MemStore};

/// What to do when a node record re-registers an already-seen original ID.
///
/// Provenance captures frequently duplicate node records across retried log
/// segments, so first-write-wins is the default; `Reject` is for sources
/// where a duplicate signals genuine ID collision and deserves a warning.
/// Neither is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    FirstWins,
    Reject,
}

/// `original_id -> node fingerprint`, write-once per ID.
pub struct NodeIndex {
    store: Box<dyn KvStore>,
    policy: DuplicatePolicy,
    registered: u64,
    duplicates: u64,
}

impl NodeIndex {
    /// In-memory index with the default duplicate policy.
    pub fn in_memory() -> Self {
        Self::with_store(Box::new(MemStore::new()), DuplicatePolicy::default())
    }

    pub fn with_store(store: Box<dyn KvStore>, policy: DuplicatePolicy) -> Self {
        Self {
            store,
            policy,
            registered: 0,
            duplicates: 0,
        }
    }

    /// Register a node fingerprint. Returns `true` if this was the first
    /// registration of `original_id`; duplicates leave the stored
    /// fingerprint untouched.
    pub fn register(&mut self, original_id: &str, fingerprint: u64) -> Result<bool> {
        if self.store.get(original_id.as_bytes())?.is_some() {
            self.duplicates += 1;
            match self.policy {
                DuplicatePolicy::FirstWins => {
                    debug!(original_id, "duplicate node registration ignored");
                }
                DuplicatePolicy::Reject => {
                    warn!(original_id, "node ID registered more than once");
                }
            }
            return Ok(false);
        }
        let encoded = bincode::serialize(&fingerprint).map_err(|e| ConvertError::Store {
            message: format!("encode failed: {e}"),
        })?;
        self.store.put(original_id.as_bytes(), &encoded)?;
        self.registered += 1;
        Ok(true)
    }

    /// Fingerprint of a registered node, or `None` for an unknown ID.
    pub fn fingerprint_of(&self, original_id: &str) -> Result<Option<u64>> {
        let Some(bytes) = self.store.get(original_id.as_bytes())? else {
            return Ok(None);
        };
        let fingerprint = bincode::deserialize(&bytes).map_err(|e| ConvertError::Store {
            message: format!("decode failed: {e}"),
        })?;
        Ok(Some(fingerprint))
    }

    /// Distinct nodes registered through this index instance.
    pub fn registered(&self) -> u64 {
        self.registered
    }

    /// Duplicate registrations seen.
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// Close the backing store.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}
