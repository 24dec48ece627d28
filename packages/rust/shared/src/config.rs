//! Application configuration for garimpo.
//!
//! User config lives at `~/.garimpo/garimpo.toml`.
//! Caller-supplied values override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GarimpoError, Result};
use crate::types::{
    Aggressiveness, CategoryCode, Condition, MinReputation, SearchParams, SortOrder,
};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "garimpo.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".garimpo";

// ---------------------------------------------------------------------------
// Config structs (matching garimpo.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default search knobs.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Crawl behavior.
    #[serde(default)]
    pub crawl: CrawlConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default result ordering.
    #[serde(default)]
    pub ordering: SortOrder,

    /// Default minimum seller reputation.
    #[serde(default)]
    pub min_reputation: MinReputation,

    /// Default category code.
    #[serde(default)]
    pub category: CategoryCode,

    /// Default item condition filter.
    #[serde(default)]
    pub condition: Condition,

    /// Default crawl pacing.
    #[serde(default)]
    pub aggressiveness: Aggressiveness,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            ordering: SortOrder::default(),
            min_reputation: MinReputation::default(),
            category: CategoryCode::ALL,
            condition: Condition::default(),
            aggressiveness: Aggressiveness::default(),
        }
    }
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Fetch every `skip_pages + 1`th result page (0 = every page).
    /// A sampling knob for quick scans over long result sets.
    #[serde(default)]
    pub skip_pages: u64,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Origin override, e.g. `http://localhost:8080`. When set, search URLs
    /// go to `{base_origin}/{subdomain}/...` instead of the marketplace
    /// hosts. Meant for mirrors and test servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_origin: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            skip_pages: 0,
            max_redirects: default_max_redirects(),
            base_origin: None,
        }
    }
}

fn default_user_agent() -> String {
    // The marketplace serves the legacy listing markup to browser agents.
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .into()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Runtime crawler config (merged from config file + caller overrides)
// ---------------------------------------------------------------------------

/// Runtime crawler configuration handed to the page crawler and the
/// reputation verifier.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Fetch every `skip_pages + 1`th result page (0 = every page).
    pub skip_pages: u64,
    /// Maximum redirects followed per request.
    pub max_redirects: usize,
    /// Origin override for mirrors and test servers.
    pub base_origin: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        CrawlerConfig::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.crawl.user_agent.clone(),
            request_timeout_secs: config.crawl.request_timeout_secs,
            skip_pages: config.crawl.skip_pages,
            max_redirects: config.crawl.max_redirects,
            base_origin: config.crawl.base_origin.clone(),
        }
    }
}

impl AppConfig {
    /// Seed [`SearchParams`] for `term` from this config's `[defaults]`.
    pub fn search_params(&self, term: impl Into<String>) -> SearchParams {
        SearchParams {
            term: term.into(),
            ordering: self.defaults.ordering,
            min_reputation: self.defaults.min_reputation,
            category: self.defaults.category,
            condition: self.defaults.condition,
            aggressiveness: self.defaults.aggressiveness,
            ..SearchParams::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.garimpo/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GarimpoError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.garimpo/garimpo.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| GarimpoError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GarimpoError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GarimpoError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GarimpoError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GarimpoError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
