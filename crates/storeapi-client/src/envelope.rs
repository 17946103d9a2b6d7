//! Response envelope types.
//!
//! Every non-empty response body from the store API is a JSON object of the
//! form `{"data": ..., "meta": {"pagination": {...}}}`. [`read_envelope`]
//! turns raw body text into an [`Envelope`]; [`Page`] is the view of one
//! envelope as a slice of a paginated collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Top-level `{data, meta}` wrapper.
///
/// Both fields are optional on the wire: a missing `data` becomes
/// [`Value::Null`] and a missing `meta` becomes an empty [`Meta`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: Meta,
}

/// The `meta` object. Only `pagination` is interpreted; other keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `meta.pagination` as reported by list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl Pagination {
    /// Whether pages after `current_page` exist.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// One page of a collection together with the pagination metadata that came
/// with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub pagination: Option<Pagination>,
}

impl Page {
    /// Interprets a read result as a page of records.
    ///
    /// An absent body or `null` data is an empty page.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedPayload`] if `data` is a scalar or object.
    pub fn from_envelope(endpoint: &str, envelope: Option<Envelope>) -> Result<Self, ApiError> {
        let Some(envelope) = envelope else {
            return Ok(Self::default());
        };
        let items = match envelope.data {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(ApiError::UnexpectedPayload {
                    endpoint: endpoint.to_owned(),
                    found: json_kind(&other).to_owned(),
                })
            }
        };
        Ok(Self {
            items,
            pagination: envelope.meta.pagination,
        })
    }
}

/// Parses raw response text into an envelope.
///
/// Returns `Ok(None)` for an empty or whitespace-only body, which is how the
/// API answers `204 No Content`. `{}` is a valid envelope with null data.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not valid JSON or is not a JSON
/// object.
pub fn read_envelope(raw: &str, context: &str) -> Result<Option<Envelope>, ApiError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let parse_err = |source: serde_json::Error| ApiError::Parse {
        context: context.to_owned(),
        source,
    };
    let value: Value = serde_json::from_str(raw).map_err(parse_err)?;
    if !value.is_object() {
        return Err(parse_err(<serde_json::Error as serde::de::Error>::custom(format!(
            "expected a JSON object envelope, got {}",
            json_kind(&value)
        ))));
    }
    serde_json::from_value(value).map(Some).map_err(parse_err)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
