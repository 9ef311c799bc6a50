//! Gem platforms
//!
//! A platform is either `ruby` (pure gems) or a `cpu-os[-version]` triple
//! such as `x86_64-linux` or `arm64-darwin-23`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, YankError};

/// A gem platform qualifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// Pure Ruby, no native code
    Ruby,
    Native {
        cpu: Option<String>,
        os: String,
        version: Option<String>,
    },
}

impl Platform {
    /// Platform of the running host
    pub fn local() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            "windows" => "mingw32",
            other => other,
        };

        let cpu = match (std::env::consts::ARCH, os) {
            ("aarch64", "darwin") => "arm64",
            ("x86_64", "mingw32") => "x64",
            (arch, _) => arch,
        };

        Platform::Native {
            cpu: Some(cpu.to_string()),
            os: os.to_string(),
            version: None,
        }
    }
}

impl FromStr for Platform {
    type Err = YankError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s == "ruby" {
            return Ok(Platform::Ruby);
        }

        let parts: Vec<&str> = s.split('-').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(YankError::InvalidPlatform(s.to_string()));
        }

        match parts.as_slice() {
            [os] => Ok(Platform::Native {
                cpu: None,
                os: os.to_string(),
                version: None,
            }),
            [cpu, os] => Ok(Platform::Native {
                cpu: Some(cpu.to_string()),
                os: os.to_string(),
                version: None,
            }),
            [cpu, os, rest @ ..] => Ok(Platform::Native {
                cpu: Some(cpu.to_string()),
                os: os.to_string(),
                version: Some(rest.join("-")),
            }),
            [] => Err(YankError::InvalidPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ruby => f.write_str("ruby"),
            Platform::Native { cpu, os, version } => {
                let parts: Vec<&str> = [cpu.as_deref(), Some(os.as_str()), version.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect();
                f.write_str(&parts.join("-"))
            }
        }
    }
}

/// Platforms the host environment recognizes: `ruby` then the local platform
pub fn default_platforms() -> Vec<Platform> {
    vec![Platform::Ruby, Platform::local()]
}

/// Parse a configured platform list
pub fn parse_platforms(names: &[String]) -> Result<Vec<Platform>> {
    names.iter().map(|name| name.parse()).collect()
}

/// Resolve the platform sent with a yank request.
///
/// Only the presence of `--platform` is consulted: the value sent is always
/// the second entry of the environment's platform list, stringified. A list
/// shorter than two entries yields an empty platform string.
pub fn platform_from_options(platform_given: bool, platforms: &[Platform]) -> Option<String> {
    if !platform_given {
        return None;
    }

    Some(platforms.get(1).map(ToString::to_string).unwrap_or_default())
}
