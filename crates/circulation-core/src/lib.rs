//! # Circulation Core
//!
//! Core library for Circulation - a library loan ledger that keeps book
//! availability, member loan counts and loan history consistent under
//! concurrent requests.
//!
//! This crate provides the ledger engine, the data model and the storage
//! backends, independent of any request layer.
//!
//! ## Architecture
//!
//! - **ledger**: the engine; every mutation is one atomic snapshot commit
//! - **ids**: entity identifiers and the monotonic id allocator
//! - **storage**: `SnapshotStore` trait, data types, memory/JSON/SQLite backends
//! - **clock**: injectable time source
//! - **fs**: atomic file replacement

pub mod clock;
pub mod error;
pub mod fs;
pub mod ids;
pub mod ledger;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Entity, ErrorKind, LedgerError, Result};
pub use ids::{BookId, Counters, MemberId, TransactionId};
pub use ledger::Ledger;
pub use storage::SnapshotStore;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
