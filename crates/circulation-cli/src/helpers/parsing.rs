//! Parsing helpers for output format and loan status.

use circulation_core::storage::LoanStatus;

use crate::errors::CliError;

/// Output format for non-JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Plain,
}

/// Parse output format string.
pub fn parse_output_format(value: Option<&str>) -> anyhow::Result<Option<OutputFormat>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.to_lowercase().as_str() {
        "table" => Ok(Some(OutputFormat::Table)),
        "plain" => Ok(Some(OutputFormat::Plain)),
        _ => Err(CliError::invalid_input(format!(
            "Invalid format: {} (use table or plain)",
            value
        ))
        .into()),
    }
}

/// Parse a `--status` filter value.
pub fn parse_loan_status(value: Option<&str>) -> anyhow::Result<Option<LoanStatus>> {
    value
        .map(|raw| {
            raw.trim()
                .to_lowercase()
                .parse::<LoanStatus>()
                .map_err(|e| CliError::invalid_input(e.to_string()).into())
        })
        .transpose()
}
