// Wire envelope types shared by every endpoint.
//
// Single values arrive as `{ data, messages, succeeded }`; list pages as
// `{ data: [], currentPage, totalPages, totalCount, pageSize,
// hasPreviousPage, hasNextPage }`. The presence of `data` is the success
// signal, not the HTTP status alone.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Single-value response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub succeeded: bool,
}

impl<T> Envelope<T> {
    /// Build a success envelope locally (no server round trip).
    pub fn ok(data: T) -> Self {
        Self {
            data,
            messages: Vec::new(),
            succeeded: true,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            data: f(self.data),
            messages: self.messages,
            succeeded: self.succeeded,
        }
    }
}

/// One page of a server-side paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub page_size: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PaginatedResult<T> {
    /// Clamp `page` into the valid range for this result.
    ///
    /// An empty result still has one (empty) page.
    pub fn bounds_page(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages.max(1))
    }

    /// Whether `page` lies past the last page reported by the server.
    pub fn is_out_of_bounds(&self, page: u32) -> bool {
        page > self.total_pages.max(1)
    }
}

/// A status code paired with a validated, typed body.
///
/// Every successful entity-client call returns this; `info` is always
/// one of the two envelope shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub info: T,
}

impl<T> ApiResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            info: f(self.info),
        }
    }
}

/// Sort directive sent with a paginated request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub id: String,
    pub desc: bool,
}

/// Body of every `POST …/paginated` call.
///
/// Field order is significant: it is the declaration order used when the
/// request doubles as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRequest {
    pub page_number: u32,
    pub page_size: u32,
    #[serde(default)]
    pub filters: IndexMap<String, String>,
    #[serde(default)]
    pub sorting: Vec<SortSpec>,
}

impl PaginatedRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            filters: IndexMap::new(),
            sorting: Vec::new(),
        }
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn with_sort(mut self, id: impl Into<String>, desc: bool) -> Self {
        self.sorting.push(SortSpec {
            id: id.into(),
            desc,
        });
        self
    }

    /// Same filters and sorting, different page.
    pub fn at_page(&self, page_number: u32) -> Self {
        Self {
            page_number,
            ..self.clone()
        }
    }
}

// ── Shape validation ────────────────────────────────────────────────

/// Check that a raw payload carries the envelope shape.
///
/// Rejects non-objects and objects whose `data` key is missing or null.
pub fn validate_envelope(payload: &Value) -> Result<(), Error> {
    let Some(obj) = payload.as_object() else {
        return Err(Error::MalformedResponse {
            message: format!("expected a JSON object, got {}", kind_of(payload)),
        });
    };
    match obj.get("data") {
        None => Err(Error::MalformedResponse {
            message: "envelope has no `data` field".into(),
        }),
        Some(Value::Null) => Err(Error::MalformedResponse {
            message: "envelope `data` is null".into(),
        }),
        Some(_) => Ok(()),
    }
}

/// Validate, then decode into the typed envelope shape `T`.
pub fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, Error> {
    validate_envelope(&payload)?;
    serde_json::from_value(payload.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: preview(&payload),
    })
}

/// Parse an error body as an envelope, if it is one.
pub(crate) fn parse_error_envelope(body: &str) -> Option<Envelope<Value>> {
    let value: Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object()?;
    if !obj.contains_key("messages") && !obj.contains_key("succeeded") {
        return None;
    }
    serde_json::from_value(value).ok()
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn preview(v: &Value) -> String {
    let s = v.to_string();
    s.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn validate_rejects_missing_data() {
        let err = validate_envelope(&json!({ "messages": [], "succeeded": true })).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn validate_rejects_null_data_and_non_objects() {
        assert!(validate_envelope(&json!({ "data": null })).is_err());
        assert!(validate_envelope(&json!([1, 2])).is_err());
        assert!(validate_envelope(&json!("ok")).is_err());
    }

    #[test]
    fn decode_paginated_shape() {
        let page: PaginatedResult<u32> = decode(json!({
            "data": [1, 2, 3],
            "currentPage": 1,
            "totalPages": 3,
            "totalCount": 23,
            "pageSize": 10,
            "hasPreviousPage": false,
            "hasNextPage": true
        }))
        .unwrap();
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next_page);
        assert!(!page.has_previous_page);
    }

    #[test]
    fn decode_type_mismatch_is_deserialization_error() {
        let err = decode::<Envelope<u32>>(json!({ "data": "nope" })).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[test]
    fn bounds_page_clamps_into_range() {
        let page: PaginatedResult<u32> = PaginatedResult {
            data: vec![],
            current_page: 2,
            total_pages: 1,
            total_count: 4,
            page_size: 10,
            has_previous_page: true,
            has_next_page: false,
        };
        assert_eq!(page.bounds_page(2), 1);
        assert_eq!(page.bounds_page(0), 1);
        assert!(page.is_out_of_bounds(2));
        assert!(!page.is_out_of_bounds(1));
    }

    #[test]
    fn paginated_request_serializes_in_declaration_order() {
        let req = PaginatedRequest::new(1, 10)
            .with_filter("nome", "Acme")
            .with_sort("nome", true);
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"pageNumber":1,"pageSize":10,"filters":{"nome":"Acme"},"sorting":[{"id":"nome","desc":true}]}"#
        );
    }

    #[test]
    fn error_envelope_requires_envelope_markers() {
        assert!(parse_error_envelope(r#"{"data":null,"messages":["x"],"succeeded":false}"#).is_some());
        assert!(parse_error_envelope(r#"{"title":"Bad Request"}"#).is_none());
        assert!(parse_error_envelope("not json").is_none());
    }
}
