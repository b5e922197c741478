//! Helper functions for CLI operations.
//!
//! This module contains argument parsing helpers shared by the command
//! handlers.

mod parsing;

pub use parsing::{parse_loan_status, parse_output_format, OutputFormat};
