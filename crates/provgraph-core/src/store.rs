//! Key-value store capability.
//!
//! The node index and the fingerprint label sink both talk to a store
//! through this narrow get/put/close interface. Two implementations:
//!
//! - [`MemStore`] — plain in-process map, the default for single-file runs
//! - [`DurableStore`] — redb-backed, for runs where node registrations must
//!   outlive one process or exceed memory (multi-file sources that reference
//!   each other's nodes)
//!
//! Which one a run gets is decided by configuration at the CLI boundary and
//! injected; nothing in the pipeline knows or cares which it holds.

use std::collections::HashMap;
use std::path::Path;

use redb::{Database, TableDefinition};

use crate::error::{ConvertError, Result};

/// Table for node registrations and label mappings (byte keys → byte values).
const ENTRIES_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("entries");

/// Minimal key-value capability: read, overwrite, close.
pub trait KvStore {
    /// Read a value. `Ok(None)` if the key was never written.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write a value, overwriting any previous one.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Flush and release the store.
    fn close(self: Box<Self>) -> Result<()>;
}

/// In-memory store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemStore {
    map: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Durable store backed by redb.
///
/// All writes go through transactions; reads use MVCC snapshots. An open
/// failure is fatal to the run ([`ConvertError::StoreUnavailable`]) because
/// every later phase depends on the store once it is configured.
pub struct DurableStore {
    db: Database,
}

impl DurableStore {
    /// Open or create a store at the given file path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ConvertError::StoreUnavailable {
                message: format!("cannot create {}: {e}", dir.display()),
            })?;
        }
        let db = Database::create(path).map_err(|e| ConvertError::StoreUnavailable {
            message: format!("failed to open {}: {e}", path.display()),
        })?;
        // Ensure the table exists so later read-only transactions can open it.
        let txn = db.begin_write().map_err(|e| ConvertError::StoreUnavailable {
            message: format!("begin_write failed: {e}"),
        })?;
        txn.open_table(ENTRIES_TABLE)
            .map_err(|e| ConvertError::StoreUnavailable {
                message: format!("open_table failed: {e}"),
            })?;
        txn.commit().map_err(|e| ConvertError::StoreUnavailable {
            message: format!("commit failed: {e}"),
        })?;
        Ok(Self { db })
    }
}

impl KvStore for DurableStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(|e| ConvertError::Store {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = txn.open_table(ENTRIES_TABLE).map_err(|e| ConvertError::Store {
            message: format!("open_table failed: {e}"),
        })?;
        let result = table.get(key).map_err(|e| ConvertError::Store {
            message: format!("get failed: {e}"),
        })?;
        Ok(result.map(|guard| guard.value().to_vec()))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let txn = self.db.begin_write().map_err(|e| ConvertError::Store {
            message: format!("begin_write failed: {e}"),
        })?;
        {
            let mut table = txn.open_table(ENTRIES_TABLE).map_err(|e| ConvertError::Store {
                message: format!("open_table failed: {e}"),
            })?;
            table.insert(key, value).map_err(|e| ConvertError::Store {
                message: format!("insert failed: {e}"),
            })?;
        }
        txn.commit().map_err(|e| ConvertError::Store {
            message: format!("commit failed: {e}"),
        })?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        // Dropping the Database flushes and releases the file lock.
        Ok(())
    }
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore").finish()
    }
}
