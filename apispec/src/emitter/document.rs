//! The interchange document produced at the end of a run.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::contract::{FieldType, ParameterLocation};
use crate::errors::RecorderError;
use crate::exchange::{is_json_media_type, HttpMethod, HttpRequest, HttpResponse, OperationId};

/// Every recorded operation, keyed and ordered by operation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecDocument {
    operations: BTreeMap<OperationId, OperationSection>,
}

impl SpecDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: OperationId, section: OperationSection) {
        self.operations.insert(id, section);
    }

    /// Section of one operation.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&OperationSection> {
        self.operations.get(operation_id)
    }

    /// Sections in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&OperationId, &OperationSection)> {
        self.operations.iter()
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True when no operation was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Pretty JSON text. Identical documents always give identical text.
    pub fn to_json_string(&self) -> Result<String, RecorderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, RecorderError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a previously written document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecorderError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Everything known about one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSection {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template.
    pub path: String,
    /// Contract description.
    pub description: String,
    /// Contract summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Grouping tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Request parameters: path, query, then headers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSection>,
    /// Response headers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_headers: Vec<ParameterSection>,
    /// Request body fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_fields: Vec<FieldSection>,
    /// Response body fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_fields: Vec<FieldSection>,
    /// Hypermedia links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkSection>,
    /// First request content type seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_content_type: Option<String>,
    /// First response content type seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_content_type: Option<String>,
    /// Distinct response statuses, ascending.
    pub status_codes: Vec<u16>,
    /// Number of examples recorded, before deduplication and capping.
    pub example_count: usize,
    /// Distinct examples, at most the configured maximum.
    pub examples: Vec<ExamplePair>,
}

/// A documented parameter or header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSection {
    /// Name.
    pub name: String,
    /// Location.
    pub location: ParameterLocation,
    /// Description.
    pub description: String,
    /// May be absent.
    #[serde(default)]
    pub optional: bool,
    /// Carried by at least one recorded example.
    #[serde(default)]
    pub observed: bool,
    /// First value seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// A documented body field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSection {
    /// Field path as declared.
    pub path: String,
    /// Description.
    pub description: String,
    /// Declared type, else the type observed in the examples.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// May be absent.
    #[serde(default)]
    pub optional: bool,
    /// Documents the whole subtree.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub subsection: bool,
    /// Present in at least one recorded example.
    #[serde(default)]
    pub observed: bool,
}

/// A documented link relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSection {
    /// Relation.
    pub rel: String,
    /// Description.
    pub description: String,
    /// May be absent.
    #[serde(default)]
    pub optional: bool,
    /// Present in at least one recorded example.
    #[serde(default)]
    pub observed: bool,
}

/// One request/response pair as written to the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamplePair {
    /// The request.
    pub request: ExampleRequest,
    /// The response.
    pub response: ExampleResponse,
}

/// Request half of an [`ExamplePair`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRequest {
    /// Concrete uri.
    pub uri: String,
    /// Headers, repeated names joined.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Content type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Body.
    #[serde(default)]
    pub body: ExampleBody,
}

/// Response half of an [`ExamplePair`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleResponse {
    /// Status code.
    pub status: u16,
    /// Headers, repeated names joined.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Content type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Body.
    #[serde(default)]
    pub body: ExampleBody,
}

impl From<&HttpRequest> for ExampleRequest {
    fn from(request: &HttpRequest) -> Self {
        Self {
            uri: request.uri.clone(),
            headers: request.headers.to_map(),
            content_type: request.content_type().map(String::from),
            body: ExampleBody::from_bytes(&request.body, request.content_type()),
        }
    }
}

impl From<&HttpResponse> for ExampleResponse {
    fn from(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.to_map(),
            content_type: response.content_type().map(String::from),
            body: ExampleBody::from_bytes(&response.body, response.content_type()),
        }
    }
}

/// A body rendered for documentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExampleBody {
    /// No body.
    #[default]
    Empty,
    /// Parsed JSON.
    Json(Value),
    /// UTF-8 text.
    Text(String),
    /// Anything else, base64 encoded.
    Binary(String),
}

impl ExampleBody {
    /// Chooses a rendition from the raw bytes and declared content type.
    ///
    /// JSON is attempted when the content type is a JSON type or missing.
    #[must_use]
    pub fn from_bytes(body: &[u8], content_type: Option<&str>) -> Self {
        if body.is_empty() {
            return Self::Empty;
        }
        if content_type.map_or(true, is_json_media_type) {
            if let Ok(json) = serde_json::from_slice::<Value>(body) {
                return Self::Json(json);
            }
        }
        match std::str::from_utf8(body) {
            Ok(text) => Self::Text(text.to_string()),
            Err(_) => Self::Binary(STANDARD.encode(body)),
        }
    }

    /// The parsed JSON, if this is a JSON body.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_renditions() {
        assert_eq!(ExampleBody::from_bytes(b"", Some("application/json")), ExampleBody::Empty);
        assert_eq!(
            ExampleBody::from_bytes(br#"{"a":1}"#, Some("application/hal+json")),
            ExampleBody::Json(json!({"a": 1}))
        );
        assert_eq!(
            ExampleBody::from_bytes(b"http://localhost/products/1", Some("text/uri-list")),
            ExampleBody::Text("http://localhost/products/1".to_string())
        );
        assert_eq!(
            ExampleBody::from_bytes(&[0xff, 0x00], Some("application/pdf")),
            ExampleBody::Binary("/wA=".to_string())
        );
        assert_eq!(
            ExampleBody::from_bytes(b"[1]", Some("text/plain")),
            ExampleBody::Text("[1]".to_string())
        );
    }

    #[test]
    fn test_body_serialization_shape() {
        let json = serde_json::to_value(ExampleBody::Json(json!({"total": 0}))).unwrap();
        assert_eq!(json, json!({"kind": "json", "value": {"total": 0}}));
        let empty = serde_json::to_value(ExampleBody::Empty).unwrap();
        assert_eq!(empty, json!({"kind": "empty"}));
    }

    #[test]
    fn test_empty_document_serializes_as_object() {
        let doc = SpecDocument::new();
        assert_eq!(doc.to_json_string().unwrap(), "{}");
        assert!(SpecDocument::from_json_str("{}").unwrap().is_empty());
    }
}
