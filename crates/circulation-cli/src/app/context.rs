//! Application context for the Circulation CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file.

use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use circulation_core::storage::{JsonFileStore, SqliteStore};
use circulation_core::{Ledger, SnapshotStore};

use crate::cli::Cli;
use crate::config::{read_config, CirculationConfig, StoreBackend};
use crate::errors::CliError;
use crate::helpers::{parse_output_format, OutputFormat};

use super::resolver::{
    missing_store_hint, resolve_config_path, resolve_store_target, StoreTarget,
};

/// Ledger over whichever backend the config selected.
pub type AppLedger = Ledger<Box<dyn SnapshotStore>>;

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config_path: OnceCell<PathBuf>,
    config: OnceCell<Option<CirculationConfig>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config_path: OnceCell::new(),
            config: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Check if JSON output was requested.
    pub fn json(&self) -> bool {
        self.cli.json
    }

    /// Table or plain text, validated against `--json`.
    pub fn output_format(&self) -> anyhow::Result<OutputFormat> {
        let format = parse_output_format(self.cli.format.as_deref())?;
        if self.cli.json && format.is_some() {
            return Err(CliError::invalid_input("--format cannot be used with --json").into());
        }
        Ok(format.unwrap_or(OutputFormat::Table))
    }

    pub fn config_path(&self) -> anyhow::Result<&Path> {
        self.config_path
            .get_or_try_init(resolve_config_path)
            .map(PathBuf::as_path)
    }

    /// The config file, if one exists. Loaded once.
    pub fn config(&self) -> anyhow::Result<Option<&CirculationConfig>> {
        let config = self.config.get_or_try_init(|| {
            let path = self.config_path()?;
            if path.exists() {
                read_config(path).map(Some)
            } else {
                Ok(None)
            }
        })?;
        Ok(config.as_ref())
    }

    /// Resolve which store this invocation targets.
    pub fn store_target(&self) -> anyhow::Result<StoreTarget> {
        resolve_store_target(self.cli, self.config()?, self.config_path()?)
    }

    /// Open the configured store and wrap it in a ledger.
    pub fn open_ledger(&self) -> anyhow::Result<AppLedger> {
        let target = self.store_target()?;
        if !target.path.exists() {
            return Err(CliError::not_found(
                format!("No store found at {}", target.path.display()),
                missing_store_hint(),
            )
            .into());
        }
        let store = open_store(&target)?;
        tracing::debug!(
            path = %target.path.display(),
            backend = store.backend(),
            "opened store"
        );
        Ok(Ledger::new(store))
    }
}

/// Open a store, creating the SQLite database if it does not exist.
pub fn open_store(target: &StoreTarget) -> anyhow::Result<Box<dyn SnapshotStore>> {
    match target.backend {
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(&target.path)?)),
        StoreBackend::Json => Ok(Box::new(JsonFileStore::open(&target.path))),
    }
}
