//! Shared mechanics every tool handler in [`crate::tools`] is built from:
//! a JSON-or-string argument coercion type, a `limit` clamp, and the
//! single outermost error-to-envelope conversion point.
//!
//! No [`crate::error::AppError`] escapes past [`call_tool`] — it is the
//! one place in the crate that turns a `Result` into the wire-level
//! [`crate::error::ErrorEnvelope`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, ErrorEnvelope, Result};

/// A tool argument accepted either already-parsed or JSON-encoded as a
/// string, per the facade's "structured JSON" argument rule.
#[derive(Debug, Clone)]
pub enum ArgValue<T> {
    Parsed(T),
    Raw(String),
}

impl<T: DeserializeOwned> ArgValue<T> {
    /// Produces the parsed value, parsing `Raw` on demand.
    ///
    /// A malformed JSON string surfaces as [`AppError::Validation`]
    /// naming the underlying parse error.
    pub fn resolve(self) -> Result<T> {
        match self {
            ArgValue::Parsed(value) => Ok(value),
            ArgValue::Raw(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Validation(format!("malformed JSON argument: {e}"))),
        }
    }
}

impl<'de, T> serde::Deserialize<'de> for ArgValue<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(raw) => Ok(ArgValue::Raw(raw)),
            other => {
                let parsed = serde_json::from_value(other).map_err(serde::de::Error::custom)?;
                Ok(ArgValue::Parsed(parsed))
            }
        }
    }
}

/// Clamps a caller-provided `limit` into `[1, 100]`, defaulting to 100
/// when absent — per §6's "upstream typically caps results at 100" and
/// §8 boundary 10 ("clamped or rejected, implementer's choice").
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(100).clamp(1, 100)
}

/// Runs `body`, converting any [`AppError`] into an [`ErrorEnvelope`].
///
/// This is the single point at which errors raised anywhere in the
/// validate → resolve → authenticate → dispatch chain are caught; no
/// intermediate layer in [`crate::tools`] should ever call this itself.
pub async fn call_tool<F, Fut>(body: F) -> std::result::Result<Value, ErrorEnvelope>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<Value>>,
{
    body().await.map_err(ErrorEnvelope::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize, Debug, PartialEq, Eq)]
    struct Fields {
        summary: String,
    }

    #[test]
    fn arg_value_resolves_parsed_object_directly() {
        let value: ArgValue<Fields> =
            serde_json::from_value(serde_json::json!({ "summary": "hi" })).unwrap();

        assert_eq!(value.resolve().unwrap(), Fields { summary: "hi".into() });
    }

    #[test]
    fn arg_value_parses_json_encoded_string() {
        let value: ArgValue<Fields> =
            serde_json::from_value(serde_json::json!("{\"summary\":\"hi\"}")).unwrap();

        assert_eq!(value.resolve().unwrap(), Fields { summary: "hi".into() });
    }

    #[test]
    fn malformed_json_string_surfaces_as_validation_error() {
        let value: ArgValue<Fields> =
            serde_json::from_value(serde_json::json!("not json")).unwrap();

        let err = value.resolve().unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn clamp_limit_defaults_to_one_hundred() {
        assert_eq!(clamp_limit(None), 100);
    }

    #[test]
    fn clamp_limit_clamps_below_and_above_range() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), 100);
        assert_eq!(clamp_limit(Some(42)), 42);
    }

    #[tokio::test]
    async fn call_tool_converts_error_to_envelope() {
        let result = call_tool(|| async { Err(AppError::Validation("bad".into())) }).await;

        let envelope = result.unwrap_err();
        assert_eq!(envelope.kind, "ValidationError");
    }

    #[tokio::test]
    async fn call_tool_passes_through_success() {
        let result = call_tool(|| async { Ok(serde_json::json!({ "ok": true })) }).await;

        assert_eq!(result.unwrap(), serde_json::json!({ "ok": true }));
    }
}
