use crate::board::BoardState;
use crate::data::{PartitionKey, Theme};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Initial board settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_columns")]
    pub columns: PartitionKey,
    #[serde(default = "default_rows")]
    pub rows: PartitionKey,
    #[serde(default = "default_true")]
    pub show_about: bool,
}

fn default_columns() -> PartitionKey {
    PartitionKey::Label
}

fn default_rows() -> PartitionKey {
    PartitionKey::Milestone
}

fn default_true() -> bool {
    true
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            columns: default_columns(),
            rows: default_rows(),
            show_about: true,
        }
    }
}

impl BoardConfig {
    pub fn initial_state(&self) -> BoardState {
        BoardState {
            theme: self.theme,
            columns_mode: self.columns,
            rows_mode: self.rows,
            show_about: self.show_about,
            ..BoardState::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// How many sources are fetched at the same time
    #[serde(default = "default_max_concurrent_sources")]
    pub max_concurrent_sources: usize,
    /// Upper bound for fetching a single source
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,
}

fn default_max_concurrent_sources() -> usize {
    4
}

fn default_source_timeout() -> u64 {
    60
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sources: default_max_concurrent_sources(),
            source_timeout_secs: default_source_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides the default location of the saved source list
    #[serde(default)]
    pub sources_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn sources_path(&self) -> Result<PathBuf> {
        match &self.sources_path {
            Some(p) => Ok(p.clone()),
            None => Ok(data_dir()?.join("sources.json")),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "poari").context("Could not determine home directory")
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the config file.
///
/// A missing file at the default location yields the defaults; a missing
/// file given explicitly is an error.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = default_config_path()?;
            if !p.exists() {
                tracing::debug!("No config at {}, using defaults", p.display());
                return Ok(Config::default());
            }
            p
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Write the default config, refusing to overwrite unless `force` is set.
pub fn init(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.board.columns, PartitionKey::Label);
        assert_eq!(config.board.rows, PartitionKey::Milestone);
        assert!(config.board.show_about);
        assert_eq!(config.loader.max_concurrent_sources, 4);
        assert!(config.storage.sources_path.is_none());
    }

    #[test]
    fn test_partial_board_section() {
        let config = parse(
            r#"
            [board]
            theme = "dark"
            rows = "assignee"
            "#,
        )
        .unwrap();
        assert_eq!(config.board.theme, Theme::Dark);
        assert_eq!(config.board.columns, PartitionKey::Label);
        assert_eq!(config.board.rows, PartitionKey::Assignee);

        let state = config.board.initial_state();
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.rows_mode, PartitionKey::Assignee);
        assert!(state.grid.is_empty());
    }

    #[test]
    fn test_unknown_partition_key_rejected() {
        assert!(parse("[board]\ncolumns = \"priority\"\n").is_err());
    }

    #[test]
    fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init(Some(&path), false).unwrap();
        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.board.columns, PartitionKey::Label);

        assert!(init(Some(&path), false).is_err());
        assert!(init(Some(&path), true).is_ok());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
