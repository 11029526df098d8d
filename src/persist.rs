//! Task ↔ redb persistence.
//!
//! redb is a save file: loaded on boot, written through on every mutation.
//! Never queried at runtime — TaskStore is the runtime truth.

use crate::store::Task;
use redb::{Database, ReadableTable, TableDefinition};
use std::sync::Arc;
use uuid::Uuid;

const TASKS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tasks");

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct SaveFile {
    db: Arc<Database>,
}

impl SaveFile {
    /// Open (or create) the save file at the given path.
    /// Creates the table if it doesn't exist.
    pub fn open(path: &str) -> Result<Self, PersistenceError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(TASKS)?;
        }
        txn.commit()?;

        Ok(SaveFile { db: Arc::new(db) })
    }

    /// Load every task from disk. Called once at boot; order is unspecified
    /// (the store imposes its own order).
    pub fn load_tasks(&self) -> Result<Vec<Task>, PersistenceError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TASKS)?;

        let mut tasks = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let task: Task = postcard::from_bytes(value.value())
                .map_err(|e| PersistenceError::Decode(e.to_string()))?;
            tasks.push(task);
        }
        Ok(tasks)
    }

    /// Write one task (insert or overwrite) in a single transaction.
    pub fn upsert_task(&self, task: &Task) -> Result<(), PersistenceError> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(TASKS)?;
            let bytes = postcard::to_allocvec(task)
                .map_err(|e| PersistenceError::Encode(e.to_string()))?;
            table.insert(task.id.as_bytes().as_slice(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Remove one task from disk. Removing an absent id is a no-op.
    pub fn remove_task(&self, id: Uuid) -> Result<(), PersistenceError> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(TASKS)?;
            table.remove(id.as_bytes().as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum PersistenceError {
    Redb(String),
    Decode(String),
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into PersistenceError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for PersistenceError {
            fn from(e: $t) -> Self { PersistenceError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Redb(e) => write!(f, "redb: {e}"),
            PersistenceError::Decode(e) => write!(f, "decode: {e}"),
            PersistenceError::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

// ── Tests ──────────────────────────────────────────────────────
