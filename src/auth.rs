//! Signing in to the gem host

use std::path::PathBuf;

use anyhow::Result;
use reqwest::Method;

use crate::credentials::Credentials;
use crate::error::YankError;
use crate::http::{ApiRequest, Transport};
use crate::ui::Ui;

/// Produces the API key requests are made with
pub trait Authenticator {
    /// Return the default API key, signing in interactively if none is stored.
    ///
    /// An error aborts the invocation.
    fn sign_in(&mut self, ui: &mut Ui) -> Result<String>;
}

/// Uses the stored default key, or exchanges email and password for a new
/// one and stores it in the credentials file
pub struct CredentialsAuthenticator<'a> {
    host: String,
    api_key: Option<String>,
    credentials_path: PathBuf,
    transport: &'a dyn Transport,
}

impl<'a> CredentialsAuthenticator<'a> {
    pub fn new(
        host: &str,
        api_key: Option<&str>,
        credentials_path: PathBuf,
        transport: &'a dyn Transport,
    ) -> Self {
        Self {
            host: host.to_string(),
            api_key: api_key.map(str::to_string),
            credentials_path,
            transport,
        }
    }
}

impl Authenticator for CredentialsAuthenticator<'_> {
    fn sign_in(&mut self, ui: &mut Ui) -> Result<String> {
        if let Some(key) = &self.api_key {
            tracing::debug!("Using stored API key");
            return Ok(key.clone());
        }

        ui.say(&format!("Enter your {} credentials.", self.host))?;
        ui.say(&format!(
            "Don't have an account yet? Create one at {}/sign_up",
            self.host.trim_end_matches('/')
        ))?;

        let email = ui.ask("   Email:   ")?;
        let password = ui.ask_secret("Password:   ")?;
        ui.say("")?;

        let request =
            ApiRequest::new(Method::GET, "api/v1/api_key").basic_auth(&email, password);
        let response = self.transport.send(&request)?;

        if !response.is_success() {
            ui.say(&response.body)?;
            return Err(YankError::SignInFailed(response.status).into());
        }

        let key = response.body.trim().to_string();

        let mut credentials = Credentials::load(&self.credentials_path)?;
        credentials.rubygems_api_key = Some(key.clone());
        credentials.save(&self.credentials_path)?;
        tracing::info!("Stored API key in {}", self.credentials_path.display());

        ui.say("Signed in.")?;
        self.api_key = Some(key.clone());

        Ok(key)
    }
}
