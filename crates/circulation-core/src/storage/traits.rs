//! Snapshot store trait definition.
//!
//! The `SnapshotStore` trait is the only contract the ledger engine needs
//! from durable storage: read the last committed dataset, and replace it
//! with compare-and-swap semantics. Backends differ only in where the bytes
//! live (memory, a JSON file, SQLite).

use super::types::Snapshot;
use crate::error::Result;

/// Result of a compare-and-swap commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The new snapshot was stored under `version`.
    Committed { version: u64 },
    /// Another commit landed first; nothing was written.
    Conflict { current: u64 },
}

/// Durable storage for the ledger dataset.
///
/// All implementations must ensure:
/// - `load` only ever returns a fully committed snapshot
/// - `commit` writes nothing unless the stored version equals `expected`
/// - a successful commit stores `next` under version `expected + 1`
pub trait SnapshotStore: Send + Sync {
    /// Load the most recently committed snapshot.
    ///
    /// A store that was never written returns `Snapshot::default()`
    /// (version 0, counters at 1).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::StoreUnavailable` if the backing storage cannot
    /// be read or decoded.
    fn load(&self) -> Result<Snapshot>;

    /// Replace the stored snapshot if its version is still `expected`.
    ///
    /// The `version` field of `next` is ignored; the store assigns
    /// `expected + 1`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::StoreUnavailable` on I/O failure. A version
    /// mismatch is not an error; it is reported as
    /// [`CommitOutcome::Conflict`].
    fn commit(&self, expected: u64, next: &Snapshot) -> Result<CommitOutcome>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&self) -> Result<Snapshot> {
        (**self).load()
    }

    fn commit(&self, expected: u64, next: &Snapshot) -> Result<CommitOutcome> {
        (**self).commit(expected, next)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Snapshot> {
        (**self).load()
    }

    fn commit(&self, expected: u64, next: &Snapshot) -> Result<CommitOutcome> {
        (**self).commit(expected, next)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
