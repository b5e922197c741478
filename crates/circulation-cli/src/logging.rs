//! Diagnostic logging setup.
//!
//! Events go to stderr so stdout stays clean for command output and
//! `--json` consumers.

use tracing_subscriber::{fmt, EnvFilter};

use crate::constants::{DEFAULT_LOG_LEVEL, LOG_ENV};

/// Pick the filter directive.
///
/// Precedence: `CIRCULATION_LOG`, then `-v` count, then the config file's
/// `log.level`, then `warn`.
pub fn filter_directive(env_value: Option<&str>, verbose: u8, config_level: Option<&str>) -> String {
    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        return value.to_string();
    }
    let from_flag = match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    from_flag
        .or(config_level)
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: u8, config_level: Option<&str>) {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(env_value.as_deref(), verbose, config_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("Warning: logging init failed: {}", e);
    }
}
