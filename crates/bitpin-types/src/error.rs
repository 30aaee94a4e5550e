//! Normalized API error
//!
//! The API reports failures in several body shapes. [`ApiError::normalize`]
//! folds all of them into one structure keyed by field name. Shapes are tried
//! in a fixed order and the first one that parses (and yields at least one
//! entry) wins:
//!
//! 1. `{"field": ["message", ...]}`
//! 2. `{"field": "message"}`
//! 3. `{"detail": "...", "code": "...", "messages": {"field": "message"}}`
//! 4. anything else, kept verbatim under the `raw` key

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Details key holding an unparseable response body
pub const RAW_DETAILS_KEY: &str = "raw";

/// Details key for the structured shape's `detail` field
pub const DETAIL_KEY: &str = "detail";

/// Details key for the structured shape's `code` field
pub const CODE_KEY: &str = "code";

/// Error returned by the API for any non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API error: {status_code} {message}")]
pub struct ApiError {
    /// HTTP status code
    pub status_code: u16,
    /// Summary built from `details` as `"field: first-message"` joined by `"; "`
    pub message: String,
    /// Messages per field
    pub details: BTreeMap<String, Vec<String>>,
}

/// Structured error body (shape 3)
#[derive(Debug, Deserialize)]
struct StructuredBody {
    detail: Option<String>,
    code: Option<String>,
    messages: Option<HashMap<String, FieldMessages>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl FieldMessages {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(message) => vec![message],
            Self::Many(messages) => messages,
        }
    }
}

/// Body shapes in the order they are attempted
#[derive(Debug)]
enum ErrorBody {
    FieldLists(HashMap<String, Vec<String>>),
    FieldMessages(HashMap<String, String>),
    Structured(StructuredBody),
    Raw(String),
}

impl ErrorBody {
    fn parse(raw: &[u8]) -> Self {
        if let Ok(fields) = serde_json::from_slice::<HashMap<String, Vec<String>>>(raw) {
            if !fields.is_empty() {
                return Self::FieldLists(fields);
            }
        }

        if let Ok(fields) = serde_json::from_slice::<HashMap<String, String>>(raw) {
            if !fields.is_empty() {
                return Self::FieldMessages(fields);
            }
        }

        if let Ok(body) = serde_json::from_slice::<StructuredBody>(raw) {
            if body.detail.is_some() || body.code.is_some() || body.messages.is_some() {
                return Self::Structured(body);
            }
        }

        Self::Raw(String::from_utf8_lossy(raw).into_owned())
    }

    fn into_details(self) -> BTreeMap<String, Vec<String>> {
        match self {
            Self::FieldLists(fields) => fields.into_iter().collect(),
            Self::FieldMessages(fields) => fields
                .into_iter()
                .map(|(field, message)| (field, vec![message]))
                .collect(),
            Self::Structured(body) => {
                let mut details = BTreeMap::new();
                if let Some(detail) = body.detail {
                    details.insert(DETAIL_KEY.to_string(), vec![detail]);
                }
                if let Some(code) = body.code {
                    details.insert(CODE_KEY.to_string(), vec![code]);
                }
                for (field, messages) in body.messages.unwrap_or_default() {
                    details
                        .entry(field)
                        .or_insert_with(Vec::new)
                        .extend(messages.into_vec());
                }
                details
            }
            Self::Raw(body) => BTreeMap::from([(RAW_DETAILS_KEY.to_string(), vec![body])]),
        }
    }
}

impl ApiError {
    /// Build an error from a status code and a response body of unknown shape
    ///
    /// Never fails: a body that matches none of the known shapes is kept
    /// verbatim under [`RAW_DETAILS_KEY`].
    pub fn normalize(status_code: u16, body: &[u8]) -> Self {
        Self::from_details(status_code, ErrorBody::parse(body).into_details())
    }

    /// Build an error from already structured details
    pub fn from_details(status_code: u16, details: BTreeMap<String, Vec<String>>) -> Self {
        let message = details
            .iter()
            .map(|(field, messages)| {
                format!(
                    "{}: {}",
                    field,
                    messages.first().map(String::as_str).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            status_code,
            message,
            details,
        }
    }

    /// Messages reported for a field
    pub fn field_messages(&self, field: &str) -> &[String] {
        self.details.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// The structured `detail` message, if present
    pub fn detail(&self) -> Option<&str> {
        self.field_messages(DETAIL_KEY).first().map(String::as_str)
    }

    /// The machine-readable `code`, if present
    pub fn code(&self) -> Option<&str> {
        self.field_messages(CODE_KEY).first().map(String::as_str)
    }

    /// The raw body, if no known shape matched
    pub fn raw_body(&self) -> Option<&str> {
        self.field_messages(RAW_DETAILS_KEY).first().map(String::as_str)
    }

    /// 401 Unauthorized
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }

    /// 403 Forbidden
    pub fn is_forbidden(&self) -> bool {
        self.status_code == 403
    }

    /// 404 Not Found
    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    /// 429 Too Many Requests
    pub fn is_rate_limited(&self) -> bool {
        self.status_code == 429
    }

    /// Any 4xx status
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Any 5xx status
    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_list_shape() {
        let err = ApiError::normalize(400, br#"{"field":["err1","err2"]}"#);
        assert_eq!(err.status_code, 400);
        assert_eq!(err.field_messages("field"), ["err1", "err2"]);
        assert_eq!(err.details.len(), 1);
        assert_eq!(err.message, "field: err1");
    }

    #[test]
    fn test_field_message_shape() {
        let err = ApiError::normalize(400, br#"{"field":"err"}"#);
        assert_eq!(err.field_messages("field"), ["err"]);
    }

    #[test]
    fn test_detail_and_code_keys() {
        let err = ApiError::normalize(403, br#"{"detail":"x","code":"Y"}"#);
        assert_eq!(err.detail(), Some("x"));
        assert_eq!(err.code(), Some("Y"));
        assert_eq!(err.message, "code: Y; detail: x");
    }

    #[test]
    fn test_structured_shape_with_messages() {
        let body = br#"{
            "detail": "Invalid input",
            "code": "invalid",
            "messages": {"price": "Too many decimals", "symbol": ["Unknown market"]}
        }"#;
        let err = ApiError::normalize(400, body);

        assert_eq!(err.detail(), Some("Invalid input"));
        assert_eq!(err.code(), Some("invalid"));
        assert_eq!(err.field_messages("price"), ["Too many decimals"]);
        assert_eq!(err.field_messages("symbol"), ["Unknown market"]);
        assert_eq!(err.details.len(), 4);
    }

    #[test]
    fn test_non_json_body_kept_raw() {
        let err = ApiError::normalize(502, b"oops");
        assert_eq!(err.details.len(), 1);
        assert_eq!(err.raw_body(), Some("oops"));
        assert_eq!(err.message, "raw: oops");
        assert!(err.is_server_error());
    }

    #[test]
    fn test_unknown_object_kept_raw() {
        let err = ApiError::normalize(400, br#"{"count": 3}"#);
        assert_eq!(err.raw_body(), Some(r#"{"count": 3}"#));

        let err = ApiError::normalize(400, b"{}");
        assert_eq!(err.raw_body(), Some("{}"));
    }

    #[test]
    fn test_empty_body() {
        let err = ApiError::normalize(500, b"");
        assert_eq!(err.raw_body(), Some(""));
    }

    #[test]
    fn test_status_predicates() {
        let err = ApiError::normalize(429, br#"{"detail":"slow down"}"#);
        assert!(err.is_rate_limited());
        assert!(err.is_client_error());
        assert!(!err.is_unauthorized());
        assert!(ApiError::normalize(401, b"").is_unauthorized());
        assert!(ApiError::normalize(404, b"").is_not_found());
    }

    #[test]
    fn test_display() {
        let err = ApiError::normalize(404, br#"{"detail":"not found"}"#);
        assert_eq!(err.to_string(), "API error: 404 detail: not found");
    }
}
