//! Bearer token lifecycle: acquire, cache, refresh, share.
//!
//! # Overview
//!
//! [`AuthManager`] exposes one public operation, [`AuthManager::get_valid_token`],
//! that guarantees at most one in-flight `/api/v2/authenticate` request is
//! ever issued across concurrent callers (§5, §8 invariant 1). The
//! building block is a `tokio::sync::Mutex<Option<Token>>`: the mutex is
//! held across the refresh's own `.await`, so a second caller arriving
//! during a refresh simply waits for the lock and then observes the fresh
//! token instead of launching a second RPC.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::time::Clock;

const EXPIRY_SKEW: Duration = Duration::from_secs(5 * 60);
const FALLBACK_TTL: Duration = Duration::from_secs(60 * 60);

/// A cached bearer token plus the instant it should be considered expired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Either wire shape the upstream authenticate endpoint may return.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthenticateResponse {
    Raw(String),
    Wrapped { token: String },
}

impl AuthenticateResponse {
    fn into_token_string(self) -> String {
        match self {
            AuthenticateResponse::Raw(s) => s,
            AuthenticateResponse::Wrapped { token } => token,
        }
    }
}

/// Acquires, caches, and refreshes a single bearer token for one upstream.
pub struct AuthManager {
    config: Config,
    http: reqwest::Client,
    clock: Arc<dyn Clock>,
    token: Mutex<Option<Token>>,
}

impl AuthManager {
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        Self::with_clock(config, http, Arc::new(crate::time::SystemClock))
    }

    pub fn with_clock(config: Config, http: reqwest::Client, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            http,
            clock,
            token: Mutex::new(None),
        }
    }

    /// Returns a token guaranteed fresh for at least [`EXPIRY_SKEW`],
    /// refreshing first if necessary.
    ///
    /// Holds its internal mutex across any refresh it performs, so
    /// concurrent callers queue behind the single in-flight refresh rather
    /// than each issuing their own.
    #[instrument(skip(self))]
    pub async fn get_valid_token(&self) -> Result<Token> {
        let mut guard = self.token.lock().await;

        let needs_refresh = match guard.as_ref() {
            Some(token) => self.clock.now() + EXPIRY_SKEW >= token.expires_at,
            None => true,
        };

        if needs_refresh {
            debug!("refreshing xray bearer token");
            let fresh = self.refresh().await?;
            *guard = Some(fresh.clone());
            Ok(fresh)
        } else {
            Ok(guard.as_ref().expect("checked Some above").clone())
        }
    }

    /// Forces the next [`AuthManager::get_valid_token`] call to refresh,
    /// regardless of the cached token's freshness. Used by
    /// [`crate::graphql::GraphQLClient`] after a 401.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    async fn refresh(&self) -> Result<Token> {
        let url = format!("{}api/v2/authenticate", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&json!({
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret(),
            }))
            .send()
            .await
            .map_err(|e| AppError::Network(format!("authenticate request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Authentication(format!(
                "authenticate returned HTTP {status}"
            )));
        }

        let body: AuthenticateResponse = response.json().await.map_err(|e| {
            AppError::Authentication(format!("authenticate response was not understood: {e}"))
        })?;
        let value = body.into_token_string();
        if value.is_empty() {
            return Err(AppError::Authentication(
                "authenticate response contained no token".into(),
            ));
        }

        let expires_at = decode_exp(&value)
            .map(|exp| exp)
            .unwrap_or_else(|| {
                warn!("token exp claim missing or malformed, defaulting to 1h TTL");
                self.clock.now() + FALLBACK_TTL
            });

        Ok(Token {
            value,
            expires_at,
        })
    }
}

/// Decodes the `exp` claim out of a JWT's payload segment without
/// verifying its signature — the issuer is already trusted (§4.2, §9);
/// `exp` is read purely to schedule our own refresh.
fn decode_exp(token: &str) -> Option<DateTime<Utc>> {
    let payload_segment = token.split('.').nth(1)?;
    let decoded = base64::Engine::decode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        payload_segment,
    )
    .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::<Utc>::from_timestamp(exp, 0)
}
