use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Primary environment variable for the backend address.
pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";
/// Older deployments still export only this one.
pub const LEGACY_BACKEND_URL_ENV: &str = "NEXT_PUBLIC_BACKEND_URL";

/// `[api]` block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Top-level transinia config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct TransiniaConfig {
    pub api: Option<ApiSection>,
}

impl TransiniaConfig {
    /// Load config from ~/.transinia/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(TransiniaConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: TransiniaConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.api.as_ref().and_then(|a| a.base_url.as_deref())
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.api.as_ref().and_then(|a| a.timeout_secs)
    }

    /// Render the file's settings for `config show`.
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref api) = self.api {
            lines.push("[api]".to_string());
            if let Some(ref url) = api.base_url {
                lines.push(format!("  base_url = \"{}\"", url));
            }
            if let Some(secs) = api.timeout_secs {
                lines.push(format!("  timeout_secs = {}", secs));
            }
        }
        if lines.is_empty() {
            lines.push("(no settings in config file)".to_string());
        }
        lines.join("\n")
    }
}

/// Settings the API client is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the effective config from CLI flags, the process environment and
    /// the config file.
    pub fn resolve(
        cli_url: Option<&str>,
        cli_timeout_secs: Option<u64>,
        file: &TransiniaConfig,
    ) -> Self {
        let primary = std::env::var(API_URL_ENV).ok();
        let legacy = std::env::var(LEGACY_BACKEND_URL_ENV).ok();
        let base_url = resolve_base_url(
            cli_url,
            primary.as_deref(),
            legacy.as_deref(),
            file.base_url(),
        );
        let secs = cli_timeout_secs
            .or_else(|| file.timeout_secs())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(base_url).with_timeout(Duration::from_secs(secs))
    }
}

/// Resolve the backend address: CLI flag > primary env > legacy env > config file > default.
/// Blank values are skipped.
pub fn resolve_base_url(
    cli_flag: Option<&str>,
    primary_env: Option<&str>,
    legacy_env: Option<&str>,
    config: Option<&str>,
) -> String {
    [cli_flag, primary_env, legacy_env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}

/// Path to the config file: ~/.transinia/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".transinia").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.transinia/config.toml
# Backend address resolution order:
#   --api-url > NEXT_PUBLIC_API_URL > NEXT_PUBLIC_BACKEND_URL > base_url > http://localhost:8001

[api]
# base_url = "http://localhost:8001"
# timeout_secs = 30
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    init_config_at(&config_path()?)
}

pub fn init_config_at(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, default_config_template())
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(true)
}
