//! Configuration management for gemyank

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::platform::{self, Platform};

/// Default gem host
pub const DEFAULT_HOST: &str = "https://rubygems.org";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gem host the yank requests are sent to
    #[serde(default = "default_host")]
    pub host: String,

    /// Path to the credentials file
    #[serde(default = "default_credentials_path")]
    pub credentials: Option<PathBuf>,

    /// Override of the platform list reported by the host environment
    #[serde(default)]
    pub platforms: Option<Vec<String>>,

    /// HTTP configuration
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

/// User config directory; `None` when no home directory can be found
fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "rubygems", "gemyank")
        .map(|d| d.config_dir().to_path_buf())
}

fn default_credentials_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("credentials.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            credentials: default_credentials_path(),
            platforms: None,
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(|| {
            config_dir()
                .map(|d| d.join("gemyank.conf"))
                .filter(|p| p.exists())
        });

        match config_path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config: {}", path.display()))
            }
            None => Ok(Config::default()),
        }
    }

    /// Path of the credentials file
    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.credentials {
            Some(path) => Ok(path.clone()),
            None => bail!(
                "Could not determine a home directory; set `credentials` in the config file"
            ),
        }
    }

    /// Platform list of the host environment, honoring the override
    pub fn platform_list(&self) -> Result<Vec<Platform>> {
        match &self.platforms {
            Some(names) => platform::parse_platforms(names).context("Invalid `platforms` in config"),
            None => Ok(platform::default_platforms()),
        }
    }
}

/// Read access to the settings a yank needs
pub trait ConfigProvider {
    /// Gem host URL
    fn host(&self) -> &str;

    /// Default API key, if one is stored
    fn api_key(&self) -> Option<&str>;

    /// Named API key from the `api_keys` table (case-sensitive)
    fn named_api_key(&self, name: &str) -> Option<&str>;

    /// Platforms the host environment recognizes, in order
    fn platforms(&self) -> &[Platform];
}

/// Settings resolved for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub credentials: Credentials,
    pub platforms: Vec<Platform>,
}

impl Settings {
    /// Resolve settings from the config file, the credentials file and an
    /// optional host override
    pub fn resolve(config: &Config, host_override: Option<&str>) -> Result<Self> {
        let host = host_override.unwrap_or(&config.host).to_string();
        let credentials = Credentials::load(&config.credentials_path()?)?.with_env_override();
        let platforms = config.platform_list()?;

        tracing::debug!(
            "Resolved host {} with {} named API key(s)",
            host,
            credentials.api_keys.len()
        );

        Ok(Self {
            host,
            credentials,
            platforms,
        })
    }
}

impl ConfigProvider for Settings {
    fn host(&self) -> &str {
        &self.host
    }

    fn api_key(&self) -> Option<&str> {
        self.credentials.rubygems_api_key.as_deref()
    }

    fn named_api_key(&self, name: &str) -> Option<&str> {
        self.credentials.api_keys.get(name).map(String::as_str)
    }

    fn platforms(&self) -> &[Platform] {
        &self.platforms
    }
}
