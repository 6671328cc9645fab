//! Application configuration for MeepleVault.
//!
//! User config lives at `~/.meeplevault/meeplevault.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MeepleVaultError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "meeplevault.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".meeplevault";

// ---------------------------------------------------------------------------
// Config structs (matching meeplevault.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// External fetch policies.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Tabular source file for the convert pass.
    #[serde(default = "default_source")]
    pub source: String,

    /// Per-item store directory.
    #[serde(default = "default_store")]
    pub store: String,

    /// Merged catalog artifact path.
    #[serde(default = "default_catalog")]
    pub catalog: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            store: default_store(),
            catalog: default_catalog(),
        }
    }
}

fn default_source() -> String {
    "data/boardgames.csv".into()
}
fn default_store() -> String {
    "details".into()
}
fn default_catalog() -> String {
    "public/games_full.json".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed pause between external lookups, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// User-Agent sent to the external game database.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    12
}
fn default_delay_ms() -> u64 {
    2000
}
fn default_user_agent() -> String {
    concat!("MeepleVaultBot/", env!("CARGO_PKG_VERSION")).into()
}

// ---------------------------------------------------------------------------
// Fill config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for the fill pass — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FillConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Fixed pause between external lookups.
    pub delay: Duration,
    /// User-Agent for external requests.
    pub user_agent: String,
    /// Only process the first N candidates (testing aid).
    pub limit: Option<usize>,
}

impl From<&AppConfig> for FillConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.fetch.timeout_secs),
            delay: Duration::from_millis(config.fetch.delay_ms),
            user_agent: config.fetch.user_agent.clone(),
            limit: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.meeplevault/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MeepleVaultError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.meeplevault/meeplevault.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MeepleVaultError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        MeepleVaultError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MeepleVaultError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MeepleVaultError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MeepleVaultError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
