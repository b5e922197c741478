//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (config problems, unexpected failures)
/// - 2: Misuse of shell command (clap argument errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const FAILURE: i32 = 1;

    /// Book, member, transaction or store not found.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Request refused by ledger rules (duplicate email, no copies, double return).
    pub const REJECTED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;

    /// Store could not be read or written; safe to retry.
    pub const STORE_UNAVAILABLE: i32 = 7;
}

/// Default log filter when neither `-v`, config, nor the environment sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "CIRCULATION_LOG";
