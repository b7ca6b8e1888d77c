//! Error taxonomy and the wire-level error envelope.
//!
//! Every failure that can reach a tool caller is one of [`AppError`]'s
//! variants. [`AppError`] never escapes the [`crate::facade`] boundary —
//! it is converted to an [`ErrorEnvelope`] exactly once, there.

use serde::Serialize;
use thiserror::Error;

use crate::resolve::ResourceKind;

/// Closed taxonomy of failure kinds, one per row of the error table.
///
/// Every branch carries enough context to build a diagnostic message, but
/// never a credential or token value (callers must not be able to recover
/// secrets from an error).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("GraphQL error: {message}")]
    GraphQl {
        message: String,
        /// Raw upstream `errors` array, or a status/body summary.
        context: serde_json::Value,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("could not resolve {key} to any known resource kind")]
    Resolution { key: String },

    #[error("{kind:?} {key} not found")]
    NotFound { kind: ResourceKind, key: String },
}

impl AppError {
    /// The exact `type` string used in the wire-level [`ErrorEnvelope`].
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "ConfigError",
            AppError::Authentication(_) => "AuthenticationError",
            AppError::Network(_) => "NetworkError",
            AppError::GraphQl { .. } => "GraphQLError",
            AppError::Validation(_) => "ValidationError",
            AppError::Resolution { .. } => "ResolutionError",
            AppError::NotFound { .. } => "NotFoundError",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("invalid JSON: {err}"))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("invalid URL: {err}"))
    }
}

/// The only shape returned to callers for a failed tool call.
///
/// Exactly two fields, always: `error` (human-readable) and `type` (drawn
/// from the closed taxonomy above).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&AppError> for ErrorEnvelope {
    fn from(err: &AppError) -> Self {
        ErrorEnvelope {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

impl From<AppError> for ErrorEnvelope {
    fn from(err: AppError) -> Self {
        ErrorEnvelope::from(&err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
