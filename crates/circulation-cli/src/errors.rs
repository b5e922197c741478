//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use circulation_core::{ErrorKind, LedgerError};

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, store, book, member, transaction)
    NotFound { message: String, hint: String },

    /// Invalid user input
    InvalidInput(String),

    /// Integrity check failed
    IntegrityFailed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => write!(f, "{}\n{}", message, hint),
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::IntegrityFailed(message) => write!(f, "Integrity check failed: {}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::IntegrityFailed(_) => exit_codes::INTEGRITY_FAILED,
        }
    }
}

/// Exit code for a ledger error kind.
pub fn ledger_exit_code(err: &LedgerError) -> i32 {
    match err.kind() {
        ErrorKind::NotFound => exit_codes::NOT_FOUND,
        ErrorKind::InvalidArgument => exit_codes::INVALID_INPUT,
        ErrorKind::Conflict | ErrorKind::BookUnavailable | ErrorKind::AlreadyReturned => {
            exit_codes::REJECTED
        }
        ErrorKind::Integrity => exit_codes::INTEGRITY_FAILED,
        ErrorKind::StoreUnavailable => exit_codes::STORE_UNAVAILABLE,
    }
}

/// Pick the exit code for any error bubbled up to `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(ledger_err) = err.downcast_ref::<LedgerError>() {
        return ledger_exit_code(ledger_err);
    }
    exit_codes::FAILURE
}

/// Contextual hint for common ledger errors.
pub fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    let ledger_err = err.downcast_ref::<LedgerError>()?;
    match ledger_err {
        LedgerError::NotFound { entity, .. } => Some(match entity {
            circulation_core::Entity::Book => "Hint: Run `circulation book list` to find book IDs.",
            circulation_core::Entity::Member => {
                "Hint: Run `circulation member list` to find member IDs."
            }
            circulation_core::Entity::Transaction => {
                "Hint: Run `circulation loan list --status issued` to find open loans."
            }
        }),
        LedgerError::BookUnavailable(_) => {
            Some("Hint: Run `circulation book list --available` to see books on the shelf.")
        }
        LedgerError::StoreUnavailable(_) => Some("Hint: Nothing was saved; it is safe to retry."),
        _ => None,
    }
}
