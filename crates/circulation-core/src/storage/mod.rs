//! Snapshot storage.
//!
//! This module defines the `SnapshotStore` trait, the ledger data types, and
//! the store backends:
//!
//! - [`MemoryStore`]: in-process, for single-instance use and tests
//! - [`JsonFileStore`]: one JSON document replaced atomically on commit
//! - [`SqliteStore`]: SQLite tables, safe across processes

pub mod json_file;
pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CommitOutcome, SnapshotStore};
pub use types::{
    Book, LoanStatus, Member, NewBook, NewMember, Snapshot, Transaction, TransactionFilter,
};
