//! A thin GraphQL client bound to one upstream endpoint and one
//! [`AuthManager`].
//!
//! # Overview
//!
//! [`GraphQLClient::execute`] posts `{query, variables}` to `/graphql`
//! with a bearer token from [`AuthManager::get_valid_token`]. On a 401 it
//! invalidates the cached token and retries exactly once — a second 401
//! is surfaced as an [`AppError::Authentication`], never retried again
//! (§5 invariant: at most one re-authentication per call).

use std::sync::Arc;

use serde_json::Value;
use tracing::{instrument, warn};

use crate::auth::AuthManager;
use crate::error::{AppError, Result};

/// Executes GraphQL operations against one Xray Cloud endpoint.
///
/// Cheap to clone: wraps a single owned [`reqwest::Client`], which is
/// itself internally reference-counted.
#[derive(Clone)]
pub struct GraphQLClient {
    http: reqwest::Client,
    endpoint: String,
    auth: Arc<AuthManager>,
}

impl GraphQLClient {
    pub fn new(http: reqwest::Client, base_url: &url::Url, auth: Arc<AuthManager>) -> Self {
        Self {
            http,
            endpoint: format!("{base_url}api/v2/graphql"),
            auth,
        }
    }

    /// Executes `query` with `variables`, returning the `data` object.
    ///
    /// Retries exactly once, after invalidating the cached token, if the
    /// first attempt is rejected with HTTP 401.
    #[instrument(skip(self, variables))]
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        match self.attempt(query, &variables).await {
            Err(AppError::Authentication(_)) => {
                warn!("upstream rejected bearer token, re-authenticating once");
                self.auth.invalidate().await;
                self.attempt(query, &variables).await
            }
            other => other,
        }
    }

    async fn attempt(&self, query: &str, variables: &Value) -> Result<Value> {
        let token = self.auth.get_valid_token().await?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&token.value)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| AppError::Network(format!("graphql request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(AppError::Authentication(
                "upstream rejected bearer token".into(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GraphQl {
                message: format!("upstream returned HTTP {status}"),
                context: serde_json::json!({ "status": status.as_u16(), "body": body }),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("graphql response was not JSON: {e}")))?;

        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(AppError::GraphQl {
                message: "upstream returned GraphQL errors".into(),
                context: errors.clone(),
            });
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }
}
