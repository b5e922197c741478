use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CirculationConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
    #[serde(default)]
    pub backend: Option<StoreBackend>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LogSection {
    pub level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Sqlite,
    Json,
}

impl StoreBackend {
    /// Guess the backend from a store file extension; SQLite unless `.json`.
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StoreBackend::Json,
            _ => StoreBackend::Sqlite,
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            StoreBackend::Sqlite => "circulation.db",
            StoreBackend::Json => "circulation.json",
        }
    }
}

impl CirculationConfig {
    pub fn new(store_path: PathBuf, backend: StoreBackend, log_level: Option<String>) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
                backend: Some(backend),
            },
            log: LogSection { level: log_level },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path(backend: StoreBackend) -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join(backend.default_file_name()))
}

pub fn read_config(path: &Path) -> anyhow::Result<CirculationConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &CirculationConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("circulation"));
        }
    }
    Ok(home_dir()?.join(".config").join("circulation"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("circulation"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("circulation"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_inferred_from_extension() {
        assert_eq!(
            StoreBackend::infer(Path::new("/tmp/lib.JSON")),
            StoreBackend::Json
        );
        assert_eq!(
            StoreBackend::infer(Path::new("/tmp/lib.db")),
            StoreBackend::Sqlite
        );
        assert_eq!(
            StoreBackend::infer(Path::new("/tmp/library")),
            StoreBackend::Sqlite
        );
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = CirculationConfig::new(
            PathBuf::from("/srv/library/circulation.json"),
            StoreBackend::Json,
            Some("info".to_string()),
        );
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("backend = \"json\""));

        let parsed: CirculationConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.store.path, "/srv/library/circulation.json");
        assert_eq!(parsed.store.backend, Some(StoreBackend::Json));
        assert_eq!(parsed.log.level.as_deref(), Some("info"));
    }

    #[test]
    fn test_log_section_is_optional() {
        let parsed: CirculationConfig =
            toml::from_str("[store]\npath = \"/tmp/c.db\"\n").unwrap();
        assert!(parsed.log.level.is_none());
        assert!(parsed.store.backend.is_none());
    }
}
