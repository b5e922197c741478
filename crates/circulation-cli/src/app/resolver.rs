//! Path resolution for config and store files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, CirculationConfig, StoreBackend};
use crate::errors::CliError;

/// Where the store lives and how to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTarget {
    pub path: PathBuf,
    pub backend: StoreBackend,
}

/// Resolve the config file path, checking CIRCULATION_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("CIRCULATION_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve the store from CLI args, falling back to the config file.
///
/// Precedence: `--store` / `CIRCULATION_STORE`, then `[store] path`.
/// The backend comes from `--backend`, then `[store] backend`, then the
/// file extension.
pub fn resolve_store_target(
    cli: &Cli,
    config: Option<&CirculationConfig>,
    config_path: &Path,
) -> anyhow::Result<StoreTarget> {
    let config_backend = config.and_then(|config| config.store.backend);

    let path = match (cli.store.as_deref(), config) {
        (Some(path), _) => PathBuf::from(path),
        (None, Some(config)) => PathBuf::from(&config.store.path),
        (None, None) => {
            return Err(CliError::not_found(
                format!("No store configured ({} not found)", config_path.display()),
                missing_store_hint(),
            )
            .into())
        }
    };

    let backend = cli
        .backend
        .or(if cli.store.is_some() { None } else { config_backend })
        .unwrap_or_else(|| StoreBackend::infer(&path));

    Ok(StoreTarget { path, backend })
}

/// Hint shown when no store can be located.
pub fn missing_store_hint() -> String {
    "Run:\n  circulation init\n\nOr specify a store path:\n  CIRCULATION_STORE=/path/to/circulation.db circulation init".to_string()
}
