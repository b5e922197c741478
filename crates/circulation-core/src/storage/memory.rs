//! In-process snapshot store.

use std::sync::{Arc, RwLock};

use crate::error::{LedgerError, Result};
use crate::storage::traits::{CommitOutcome, SnapshotStore};
use crate::storage::types::Snapshot;

/// Lock-guarded snapshot for single-instance deployments and tests.
///
/// Readers clone the current `Arc` and release the lock immediately, so a
/// reader never holds up a writer for longer than a pointer swap.
#[derive(Debug, Default)]
pub struct MemoryStore {
    current: RwLock<Arc<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing dataset, keeping its version.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    fn poisoned() -> LedgerError {
        LedgerError::StoreUnavailable("Memory store lock poisoned".to_string())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Snapshot> {
        let current = self.current.read().map_err(|_| Self::poisoned())?;
        Ok(Snapshot::clone(&current))
    }

    fn commit(&self, expected: u64, next: &Snapshot) -> Result<CommitOutcome> {
        let mut current = self.current.write().map_err(|_| Self::poisoned())?;
        if current.version != expected {
            return Ok(CommitOutcome::Conflict {
                current: current.version,
            });
        }

        let mut stored = next.clone();
        stored.version = expected + 1;
        let version = stored.version;
        *current = Arc::new(stored);
        Ok(CommitOutcome::Committed { version })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_store_is_empty_at_version_zero() {
        let store = MemoryStore::new();
        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.books.is_empty());
    }

    #[test]
    fn test_commit_bumps_version() {
        let store = MemoryStore::new();
        let mut next = store.load().unwrap();
        next.counters.next_book_id = 5;

        let outcome = store.commit(0, &next).unwrap();
        assert_eq!(outcome, CommitOutcome::Committed { version: 1 });

        let loaded = store.load().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.counters.next_book_id, 5);
    }

    #[test]
    fn test_stale_commit_is_rejected_without_writing() {
        let store = MemoryStore::new();
        let base = store.load().unwrap();
        store.commit(0, &base).unwrap();

        let mut stale = base.clone();
        stale.counters.next_member_id = 99;
        let outcome = store.commit(0, &stale).unwrap();
        assert_eq!(outcome, CommitOutcome::Conflict { current: 1 });
        assert_eq!(store.load().unwrap().counters.next_member_id, 1);
    }
}
