//! Query string encoding for GET parameters
//!
//! Parameter structs derive `Serialize`; their serde field names become the
//! query keys and `#[serde(skip)]` fields are ignored. Encoding rules:
//!
//! - Fields are emitted in declaration order.
//! - Zero values are dropped: `None`, empty strings, zero numbers, empty
//!   sequences. Optional filters therefore never reach the query string.
//!   Decimals serialize as strings, so a string holding a zero decimal
//!   (`"0"`, `"0.00"`) counts as a zero number.
//! - Booleans are always emitted, `false` included, since `false` is a
//!   meaningful filter.
//! - Sequences expand into one `key=value` pair per element, in order.
//! - Everything else is rendered in its canonical string form.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

/// Errors produced while encoding query parameters
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The parameters did not serialize to a record
    #[error("query parameters must be a struct, got {0}")]
    NotAStruct(&'static str),

    /// The parameters could not be serialized
    #[error("failed to serialize query parameters: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The key/value pairs could not be percent-encoded
    #[error("failed to encode query string: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

/// Encode a parameter struct into a percent-encoded query string
///
/// Returns an empty string when every field holds its zero value.
///
/// # Example
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Filters {
///     symbol: Option<String>,
///     tags: Vec<String>,
///     active: bool,
/// }
///
/// let query = bitpin_rest::query::encode(&Filters {
///     symbol: None,
///     tags: vec!["a".into(), "b".into()],
///     active: false,
/// })
/// .unwrap();
/// assert_eq!(query, "tags=a&tags=b&active=false");
/// ```
pub fn encode<T: Serialize + ?Sized>(params: &T) -> Result<String, QueryError> {
    let pairs = to_pairs(params)?;
    Ok(serde_urlencoded::to_string(&pairs)?)
}

/// Key/value pairs that [`encode`] would emit, before percent-encoding
pub fn to_pairs<T: Serialize + ?Sized>(params: &T) -> Result<Vec<(String, String)>, QueryError> {
    match serde_json::to_value(params)? {
        Value::Object(fields) => Ok(collect_pairs(fields)),
        other => Err(QueryError::NotAStruct(kind_name(&other))),
    }
}

fn collect_pairs(fields: Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(fields.len());

    for (key, value) in fields {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(rendered) = render_element(item) {
                        pairs.push((key.clone(), rendered));
                    }
                }
            }
            other => {
                if let Some(rendered) = render_field(other) {
                    pairs.push((key, rendered));
                }
            }
        }
    }

    pairs
}

/// Render a top-level field, `None` for zero values
fn render_field(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(flag.to_string()),
        Value::String(text) if text.is_empty() || is_zero_decimal(&text) => None,
        Value::String(text) => Some(text),
        Value::Number(number) if is_zero(&number) => None,
        Value::Number(number) => Some(number.to_string()),
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Render one element of a sequence field; only nulls are dropped
fn render_element(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn is_zero(number: &Number) -> bool {
    number.as_f64() == Some(0.0)
}

fn is_zero_decimal(text: &str) -> bool {
    Decimal::from_str(text).is_ok_and(|value| value.is_zero())
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "object",
    }
}
