//! Application configuration for codecache.
//!
//! User config lives at `~/.codecache/codecache.toml`.
//! CLI flags and environment variables override config file values, which
//! override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CodeCacheError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "codecache.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".codecache";

// ---------------------------------------------------------------------------
// Config structs (matching codecache.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Knowledge cache location.
    #[serde(default)]
    pub cache: CacheSection,

    /// Hook log location.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Project identity used in activity records.
    #[serde(default)]
    pub project: ProjectConfig,

    /// Knowledge-graph collaborator settings.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Issue-tracker collaborator settings.
    #[serde(default)]
    pub github: GitHubConfig,
}

/// `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSection {
    /// Cache root. Relative paths resolve against the working directory.
    #[serde(default = "default_cache_root")]
    pub root: String,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            root: default_cache_root(),
        }
    }
}

fn default_cache_root() -> String {
    ".claude/knowledge".into()
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory holding `hooks.log`.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
        }
    }
}

fn default_logs_dir() -> String {
    ".claude/hooks/logs".into()
}

/// `[project]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name. Falls back to the working directory's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `[graph]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Address probed to decide whether the graph store is reachable.
    #[serde(default = "default_probe_addr")]
    pub probe_addr: String,

    /// Connect timeout for the probe, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            probe_addr: default_probe_addr(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl GraphConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

fn default_probe_addr() -> String {
    "localhost:7687".into()
}
fn default_probe_timeout_ms() -> u64 {
    5000
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Name of the env var holding the API token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Repository owner. Detected from the `origin` remote when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Repository name. Detected from the `origin` remote when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            owner: None,
            repo: None,
        }
    }
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}

// ---------------------------------------------------------------------------
// Cache config (runtime, resolved against a base directory)
// ---------------------------------------------------------------------------

/// Runtime cache configuration, injected into every store and assembler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Absolute directory holding all artifacts.
    pub root: PathBuf,
}

impl CacheConfig {
    /// Resolve the configured root against `base` (normally the working directory).
    pub fn resolve(config: &AppConfig, base: &Path) -> Self {
        Self {
            root: resolve_path(&config.cache.root, base),
        }
    }
}

/// Join `value` onto `base` unless it is already absolute.
pub fn resolve_path(value: &str, base: &Path) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.codecache/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CodeCacheError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.codecache/codecache.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| CodeCacheError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CodeCacheError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CodeCacheError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CodeCacheError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CodeCacheError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
