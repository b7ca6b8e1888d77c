//! Credentials and base URL, read once at process start.
//!
//! # Overview
//!
//! [`Config`] is the immutable result of reading three environment
//! variables. It is produced once by the composition root (`main.rs`) and
//! handed by reference to [`crate::auth::AuthManager`] and
//! [`crate::graphql::GraphQLClient`]. It is never mutated and never logged
//! in full (the secret is never `Display`ed or `Debug`-printed).

use url::Url;

use crate::error::{AppError, Result};

const DEFAULT_BASE_URL: &str = "https://xray.cloud.getxray.app";

/// An abstract source of environment-like key/value pairs.
///
/// Exists so [`Config::from_env`] can be exercised in tests without
/// mutating the real process environment. [`std::env::Vars`] access is
/// provided via [`ProcessEnv`].
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<'a> EnvSource for std::collections::HashMap<&'a str, &'a str> {
    fn get(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

/// Immutable Jira Xray credentials plus the upstream base URL.
///
/// Created once at process start and never mutated; its fields are never
/// logged (the `Debug` impl is intentionally hand-written to redact the
/// secret).
#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    client_secret: String,
    pub base_url: Url,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl Config {
    /// The client secret, for use only by [`crate::auth::AuthManager`]
    /// when building the authenticate request body.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Reads `XRAY_CLIENT_ID`, `XRAY_CLIENT_SECRET`, and `XRAY_BASE_URL`
    /// from `source`.
    ///
    /// Fails with [`AppError::Config`] if either required key is absent or
    /// empty, or if the base URL (explicit or default) is not a
    /// syntactically valid absolute HTTPS URL.
    pub fn from_env(source: &impl EnvSource) -> Result<Self> {
        let client_id = non_empty(source, "XRAY_CLIENT_ID")?;
        let client_secret = non_empty(source, "XRAY_CLIENT_SECRET")?;

        let raw_base_url = source
            .get("XRAY_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let base_url = Url::parse(&raw_base_url)
            .map_err(|e| AppError::Config(format!("XRAY_BASE_URL is not a valid URL: {e}")))?;

        if base_url.scheme() != "https" {
            return Err(AppError::Config(
                "XRAY_BASE_URL must be an absolute HTTPS URL".into(),
            ));
        }
        if base_url.host_str().is_none() {
            return Err(AppError::Config(
                "XRAY_BASE_URL must be an absolute HTTPS URL".into(),
            ));
        }

        Ok(Config {
            client_id,
            client_secret,
            base_url,
        })
    }
}

fn non_empty(source: &impl EnvSource, key: &str) -> Result<String> {
    match source.get(key) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Config(format!("{key} is required and must be non-empty"))),
    }
}
