//! API key storage
//!
//! Credentials live in a TOML file separate from the main config so that
//! it can be kept at mode 0600:
//!
//! ```toml
//! rubygems_api_key = "rubygems_0123..."
//!
//! [api_keys]
//! work = "rubygems_4567..."
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Environment variable that overrides the default API key
pub const API_KEY_ENV: &str = "GEM_HOST_API_KEY";

/// Stored API keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Default API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubygems_api_key: Option<String>,

    /// Named API keys, selected with `--key`
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
}

impl Credentials {
    /// Load credentials; a missing file means no stored keys
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No credentials file at {}", path.display());
            return Ok(Self::default());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let mode = fs::metadata(path)?.mode() & 0o777;
            if mode & 0o077 != 0 {
                tracing::warn!(
                    "Credentials file {} has insecure permissions {:o}. Fix with: chmod 600 {}",
                    path.display(),
                    mode,
                    path.display()
                );
            }
        }

        let content = Zeroizing::new(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read credentials: {}", path.display()))?,
        );
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse credentials: {}", path.display()))
    }

    /// Write credentials with owner-only permissions
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create credentials directory: {}", parent.display())
            })?;
        }

        let content = Zeroizing::new(toml::to_string_pretty(self)?);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to write credentials: {}", path.display()))?;
            std::io::Write::write_all(&mut file, content.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, content.as_bytes())
                .with_context(|| format!("Failed to write credentials: {}", path.display()))?;
        }

        Ok(())
    }

    /// Apply `GEM_HOST_API_KEY` on top of the stored default key
    pub fn with_env_override(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            tracing::debug!("Using API key from {}", API_KEY_ENV);
            self.rubygems_api_key = Some(key);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let creds = Credentials::load(&dir.path().join("credentials.toml")).unwrap();
        assert!(creds.rubygems_api_key.is_none());
        assert!(creds.api_keys.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        let mut creds = Credentials::default();
        creds.rubygems_api_key = Some("abc123".to_string());
        creds.api_keys.insert("ci".to_string(), "def456".to_string());
        creds.save(&path).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let mode = fs::metadata(&path).unwrap().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }

        let loaded = Credentials::load(&path).unwrap();
        assert_eq!(loaded.rubygems_api_key.as_deref(), Some("abc123"));
        assert_eq!(loaded.api_keys.get("ci").map(String::as_str), Some("def456"));
    }

    #[test]
    fn test_parse_named_keys_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "[api_keys]\nwork = \"w\"\n").unwrap();

        let creds = Credentials::load(&path).unwrap();
        assert!(creds.rubygems_api_key.is_none());
        assert_eq!(creds.api_keys.len(), 1);
    }

    #[test]
    fn test_api_key_override() {
        let mut creds = Credentials::default();
        creds.rubygems_api_key = Some("stored".to_string());

        let creds = creds.with_api_key_override(Some(String::new()));
        assert_eq!(creds.rubygems_api_key.as_deref(), Some("stored"));

        let creds = creds.with_api_key_override(Some("from-env".to_string()));
        assert_eq!(creds.rubygems_api_key.as_deref(), Some("from-env"));
    }
}
