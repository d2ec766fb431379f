//! Deterministic attribute fingerprinting.
//!
//! A fingerprint is a 64-bit xxh64 digest of an ordered list of string
//! attributes. The same list always produces the same value, in any process,
//! on any platform — fingerprints are compared across runs and across
//! machines, so nothing seed- or layout-dependent is allowed here.
//!
//! By convention the type string is always the first part for nodes, so two
//! nodes whose remaining metadata happens to coincide still disambiguate on
//! type.

use xxhash_rust::xxh64::Xxh64;

use crate::error::Result;
use crate::store::KvStore;

/// Sentinel placed in the parts list when an optional attribute is absent,
/// keeping fingerprints well-defined for records with missing fields.
pub const ABSENT: &str = "N/A";

/// Hash an ordered list of string parts into a single 64-bit value.
///
/// The hasher is updated with each part in list order; list order is
/// significant, call history is not.
pub fn fingerprint<S: AsRef<str>>(parts: &[S]) -> u64 {
    let mut hasher = Xxh64::new(0);
    for part in parts {
        hasher.update(part.as_ref().as_bytes());
    }
    hasher.digest()
}

/// Fingerprint computer with an optional reverse-lookup label sink.
///
/// When a label store is attached, every digest records `(hash, parts)` so
/// an analyst can later recover what a fingerprint in the output stood for.
/// Collisions overwrite the stored parts (last write wins) — the sink is a
/// forensic aid, not a collision-resistant index.
pub struct Fingerprinter {
    labels: Option<Box<dyn KvStore>>,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self { labels: None }
    }

    /// Attach a reverse-lookup store for `(fingerprint, parts)` pairs.
    pub fn with_label_store(store: Box<dyn KvStore>) -> Self {
        Self {
            labels: Some(store),
        }
    }

    /// Compute the fingerprint of `parts`, recording it in the label store
    /// if one is attached.
    pub fn digest(&mut self, parts: &[String]) -> Result<u64> {
        let hash = fingerprint(parts);
        if let Some(store) = self.labels.as_mut() {
            store.put(
                hash.to_string().as_bytes(),
                parts.join("\t").as_bytes(),
            )?;
        }
        Ok(hash)
    }

    /// Close the label store, if any, flushing it to disk.
    pub fn close(self) -> Result<()> {
        match self.labels {
            Some(store) => store.close(),
            None => Ok(()),
        }
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}
