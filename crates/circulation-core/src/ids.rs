//! Entity identifiers and the per-collection id allocator.
//!
//! Ids are plain integers on the wire. The allocator state lives in
//! [`Counters`], which is persisted inside the same snapshot as the records it
//! numbers, so allocating an id and storing the record commit together.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Book`](crate::storage::Book).
    BookId
);
entity_id!(
    /// Identifier of a [`Member`](crate::storage::Member).
    MemberId
);
entity_id!(
    /// Identifier of a [`Transaction`](crate::storage::Transaction).
    TransactionId
);

/// Next id to hand out per entity type.
///
/// Counters only move forward. Deleting a record never returns its id to the
/// pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub next_book_id: u64,
    pub next_member_id: u64,
    pub next_transaction_id: u64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            next_book_id: 1,
            next_member_id: 1,
            next_transaction_id: 1,
        }
    }
}

impl Counters {
    pub fn allocate_book(&mut self) -> Result<BookId> {
        advance(&mut self.next_book_id, "book").map(BookId)
    }

    pub fn allocate_member(&mut self) -> Result<MemberId> {
        advance(&mut self.next_member_id, "member").map(MemberId)
    }

    pub fn allocate_transaction(&mut self) -> Result<TransactionId> {
        advance(&mut self.next_transaction_id, "transaction").map(TransactionId)
    }
}

fn advance(counter: &mut u64, collection: &str) -> Result<u64> {
    let id = *counter;
    if id == 0 {
        return Err(LedgerError::Integrity(format!(
            "{} counter is zero",
            collection
        )));
    }
    *counter = id
        .checked_add(1)
        .ok_or_else(|| LedgerError::Integrity(format!("{} id space exhausted", collection)))?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_one_and_advance_independently() {
        let mut counters = Counters::default();
        assert_eq!(counters.allocate_book().unwrap(), BookId(1));
        assert_eq!(counters.allocate_book().unwrap(), BookId(2));
        assert_eq!(counters.allocate_member().unwrap(), MemberId(1));
        assert_eq!(counters.allocate_transaction().unwrap(), TransactionId(1));
        assert_eq!(counters.next_book_id, 3);
        assert_eq!(counters.next_member_id, 2);
    }

    #[test]
    fn test_exhausted_counter_is_an_integrity_error() {
        let mut counters = Counters {
            next_book_id: u64::MAX,
            ..Counters::default()
        };
        let err = counters.allocate_book().unwrap_err();
        assert!(matches!(err, LedgerError::Integrity(_)));
        assert_eq!(counters.next_book_id, u64::MAX);
    }

    #[test]
    fn test_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&TransactionId(9)).unwrap();
        assert_eq!(json, "9");
    }
}
