//! Response normalization.
//!
//! # Responsibilities
//! - Read the body as text first; never assume JSON
//! - Surface non-2xx status as `ApiError::Http`
//! - Unwrap the `{ success, message, data }` envelope where present
//!
//! # Design Decisions
//! - Empty body is an empty object, not an error
//! - Parse failures keep the raw text for diagnosis
//! - One tagged union (`Payload`) covers wrapped, data-less and unwrapped
//!   shapes, so call sites never guess with `data || whole`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// Status and body text of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The standard backend wrapper. A null `data` reads as `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A successfully normalized response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Envelope with non-null `data`.
    Data { message: String, data: Value },
    /// Envelope whose `data` is absent or null; holds the whole object so
    /// top-level flags stay reachable.
    Envelope(Value),
    /// Body without a `success` field (paginated listings, bare flags, `{}`).
    Bare(Value),
}

impl Payload {
    /// The value a caller should map: `data` when present, else the body.
    pub fn value(&self) -> &Value {
        match self {
            Payload::Data { data, .. } => data,
            Payload::Envelope(v) | Payload::Bare(v) => v,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Payload::Data { data, .. } => data,
            Payload::Envelope(v) | Payload::Bare(v) => v,
        }
    }

    /// Server message, if the body carried a non-empty one.
    pub fn message(&self) -> Option<&str> {
        let message = match self {
            Payload::Data { message, .. } => Some(message.as_str()),
            Payload::Envelope(v) | Payload::Bare(v) => v.get("message").and_then(Value::as_str),
        };
        message.filter(|m| !m.is_empty())
    }

    /// `Some(message)` when a 2xx body still reported `success: false`.
    pub fn rejection(&self) -> Option<String> {
        match self {
            Payload::Envelope(v) if v.get("success") == Some(&Value::Bool(false)) => Some(
                v.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Request was rejected")
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Decode the mapped value into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> ApiResult<T> {
        let value = self.into_value();
        serde_json::from_value(value.clone()).map_err(|e| ApiError::MalformedResponse {
            reason: e.to_string(),
            body: value.to_string(),
        })
    }

    /// Read a boolean that may be the value itself or a top-level field.
    pub fn flag(&self, keys: &[&str]) -> Option<bool> {
        let value = self.value();
        if let Some(b) = value.as_bool() {
            return Some(b);
        }
        keys.iter().find_map(|k| value.get(*k).and_then(Value::as_bool))
    }
}

/// Normalize a raw response into a [`Payload`] or a typed error.
pub fn normalize(raw: &RawResponse) -> ApiResult<Payload> {
    let value = if raw.body.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str::<Value>(&raw.body).map_err(|e| {
            tracing::error!(status = raw.status, error = %e, body = %raw.body, "Response body is not valid JSON");
            ApiError::MalformedResponse {
                reason: e.to_string(),
                body: raw.body.clone(),
            }
        })?
    };

    if !raw.is_success() {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed ({})", raw.status));
        return Err(ApiError::Http {
            status: raw.status,
            message,
        });
    }

    let is_envelope = value.as_object().is_some_and(|o| o.contains_key("success"));
    if !is_envelope {
        return Ok(Payload::Bare(value));
    }

    // An envelope that does not fit the standard shape keeps the whole body.
    match ApiEnvelope::<Value>::deserialize(&value) {
        Ok(ApiEnvelope { message, data: Some(data), .. }) => Ok(Payload::Data { message, data }),
        _ => Ok(Payload::Envelope(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_empty_object() {
        let payload = normalize(&RawResponse::new(200, "")).unwrap();
        assert_eq!(payload, Payload::Bare(json!({})));
    }

    #[test]
    fn test_invalid_json_keeps_text() {
        let err = normalize(&RawResponse::new(200, "<html>oops</html>")).unwrap_err();
        match err {
            ApiError::MalformedResponse { body, .. } => assert_eq!(body, "<html>oops</html>"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_data_unwrapped() {
        let raw = RawResponse::new(200, r#"{"success":true,"message":"ok","data":[1,2]}"#);
        let payload = normalize(&raw).unwrap();
        assert_eq!(payload.message(), Some("ok"));
        assert_eq!(payload.decode::<Vec<i64>>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_null_data_returns_whole_envelope() {
        let raw = RawResponse::new(200, r#"{"success":true,"message":"done","data":null}"#);
        let payload = normalize(&raw).unwrap();
        assert_eq!(payload, Payload::Envelope(json!({"success": true, "message": "done", "data": null})));
        assert_ne!(payload.value(), &Value::Null);
    }

    #[test]
    fn test_null_message_still_unwraps() {
        let payload = normalize(&RawResponse::new(200, r#"{"success":true,"message":null,"data":[1]}"#)).unwrap();
        assert_eq!(payload, Payload::Data { message: String::new(), data: json!([1]) });
        assert_eq!(payload.message(), None);
    }

    #[test]
    fn test_false_data_is_still_data() {
        let raw = RawResponse::new(200, r#"{"success":true,"message":"status","data":false}"#);
        let payload = normalize(&raw).unwrap();
        assert_eq!(payload.flag(&["isLiked"]), Some(false));
        assert!(matches!(payload, Payload::Data { .. }));
    }

    #[test]
    fn test_top_level_flag() {
        let raw = RawResponse::new(200, r#"{"success":true,"message":"x","isLiked":true}"#);
        let payload = normalize(&raw).unwrap();
        assert_eq!(payload.flag(&["isLiked"]), Some(true));
    }

    #[test]
    fn test_unwrapped_listing() {
        let raw = RawResponse::new(200, r#"{"videos":[],"total":0,"page":0,"perPage":20}"#);
        let payload = normalize(&raw).unwrap();
        assert!(matches!(payload, Payload::Bare(_)));
        assert_eq!(payload.value()["perPage"], 20);
    }

    #[test]
    fn test_http_failure_uses_server_message() {
        let raw = RawResponse::new(400, r#"{"success":false,"message":"Already subscribed"}"#);
        let err = normalize(&raw).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Already subscribed");
    }

    #[test]
    fn test_http_failure_generic_message() {
        let err = normalize(&RawResponse::new(502, "")).unwrap_err();
        assert_eq!(err.to_string(), "Request failed (502)");
    }

    #[test]
    fn test_success_false_with_ok_status() {
        let raw = RawResponse::new(200, r#"{"success":false,"message":"nope"}"#);
        let payload = normalize(&raw).unwrap();
        assert_eq!(payload.rejection().as_deref(), Some("nope"));
    }

    #[test]
    fn test_decode_mismatch_is_malformed() {
        let raw = RawResponse::new(200, r#"{"success":true,"message":"","data":"not a list"}"#);
        let err = normalize(&raw).unwrap().decode::<Vec<i64>>().unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }
}
