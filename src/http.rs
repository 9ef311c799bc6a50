//! Gem host API transport
//!
//! Requests are addressed by a path relative to the host
//! (`<host>/<path>`) and carry an optional form-encoded body.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Method;
use zeroize::Zeroizing;

use crate::error::YankError;

/// A single request against the gem host API
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the host, e.g. `api/v1/gems/yank`
    pub path: String,
    pub headers: Vec<(String, String)>,
    /// Form fields, sent in order
    pub form: Vec<(String, String)>,
    pub basic_auth: Option<(String, Zeroizing<String>)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            form: Vec::new(),
            basic_auth: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn form_field(mut self, name: &str, value: &str) -> Self {
        self.form.push((name.to_string(), value.to_string()));
        self
    }

    pub fn basic_auth(mut self, username: &str, password: Zeroizing<String>) -> Self {
        self.basic_auth = Some((username.to_string(), password));
        self
    }
}

#[cfg(test)]
impl ApiRequest {
    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a form field by name
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response from the gem host
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues API requests against a gem host
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Blocking HTTP transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    host: String,
}

impl HttpTransport {
    pub fn new(host: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("gemyank/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            host: host.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), path)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path);
        tracing::info!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password.as_str()));
        }

        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().map_err(|source| YankError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status().as_u16();
        tracing::debug!("HTTP {} from {}", status, url);

        let body = response
            .text()
            .map_err(|source| YankError::Transport { url, source })?;

        Ok(ApiResponse { status, body })
    }
}
