//! Error types for gemyank

use thiserror::Error;

/// Main error type for gemyank operations
#[derive(Error, Debug)]
pub enum YankError {
    #[error("Please specify a gem name on the command line (e.g. {program} GEM -v VERSION)")]
    MissingGemName { program: String },

    #[error("Too many gem names ({0}); please specify only one")]
    TooManyGemNames(String),

    #[error("Invalid version requirement: {0}")]
    InvalidRequirement(String),

    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("Sign in failed: HTTP {0}")]
    SignInFailed(u16),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result type alias for gemyank operations
pub type Result<T> = std::result::Result<T, YankError>;
