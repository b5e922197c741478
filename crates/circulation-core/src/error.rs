//! Error types for circulation core operations.
//!
//! Every ledger operation either commits completely or returns one of these
//! errors with the store left untouched. The CLI layer maps the error kind to
//! exit codes and user-facing messages.

use std::fmt;

use thiserror::Error;

/// Result type alias for circulation operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Entity collections tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Book,
    Member,
    Transaction,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Book => "book",
            Entity::Member => "member",
            Entity::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

/// Core error type for ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input; retrying the same call will fail the same way
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced book, member or transaction does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: u64 },

    /// Uniqueness violation (duplicate member email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Book is missing or has no copies on the shelf
    #[error("Book {0} is not available")]
    BookUnavailable(u64),

    /// Transaction was already closed by an earlier return
    #[error("Transaction {0} was already returned")]
    AlreadyReturned(u64),

    /// Store I/O failure or lost compare-and-swap; nothing was committed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Persisted state violates a ledger invariant
    #[error("Integrity error: {0}")]
    Integrity(String),
}

/// Fieldless tag for [`LedgerError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    BookUnavailable,
    AlreadyReturned,
    StoreUnavailable,
    Integrity,
}

impl LedgerError {
    pub fn not_found(entity: Entity, id: impl Into<u64>) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        LedgerError::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::Conflict(_) => ErrorKind::Conflict,
            LedgerError::BookUnavailable(_) => ErrorKind::BookUnavailable,
            LedgerError::AlreadyReturned(_) => ErrorKind::AlreadyReturned,
            LedgerError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            LedgerError::Integrity(_) => ErrorKind::Integrity,
        }
    }

    /// Whether the caller may safely re-issue the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::StoreUnavailable(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::StoreUnavailable(format!("JSON error: {}", err))
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        // A rejected CHECK/UNIQUE/FOREIGN KEY means the data is wrong, not the store.
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => {
                LedgerError::Integrity(format!("SQLite constraint violated: {}", err))
            }
            _ => LedgerError::StoreUnavailable(format!("SQLite error: {}", err)),
        }
    }
}
