//! Error types for the apispec recorder.
//!
//! Errors are grouped by how far they propagate: contract declaration
//! errors skip one operation, normalization errors reject one exchange,
//! registry conflicts abort the documentation pass and an empty registry
//! is a warning unless configured otherwise.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// The main error type for recorder operations.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// A contract declaration was malformed.
    #[error("{0}")]
    InvalidContract(#[from] InvalidContractError),

    /// An observed exchange violated its contract.
    #[error("{0}")]
    Normalization(#[from] NormalizationError),

    /// Two recordings disagree on method or path for the same operation id.
    #[error("{0}")]
    ConflictingOperation(#[from] ConflictingOperationError),

    /// Emission was requested on a registry with no operations.
    #[error("{0}")]
    EmptyRegistry(#[from] EmptyRegistryError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecorderError {
    /// Returns diagnostics metadata for this error, when it has any.
    #[must_use]
    pub fn error_info(&self) -> Option<ContractErrorInfo> {
        match self {
            Self::InvalidContract(err) => Some(err.error_info()),
            Self::Normalization(err) => Some(err.error_info()),
            Self::ConflictingOperation(err) => Some(err.error_info()),
            Self::EmptyRegistry(err) => Some(err.error_info()),
            Self::Serialization(_) | Self::Io(_) => None,
        }
    }

    /// True when the error must abort the whole documentation pass.
    #[must_use]
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, Self::ConflictingOperation(_) | Self::EmptyRegistry(_))
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "APISPEC-002-MISSING_FIELD").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info, pre-filled with the default fix hint for `code`.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            fix_hint: ErrorSuggestions::get(&code).map(String::from),
            code,
            summary: summary.into(),
            context: BTreeMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a JSON representation for logs and events.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("code".to_string(), serde_json::json!(self.code));
        map.insert("summary".to_string(), serde_json::json!(self.summary));
        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        if !self.context.is_empty() {
            map.insert("context".to_string(), serde_json::json!(self.context));
        }
        serde_json::Value::Object(map)
    }
}

/// Stable error codes.
pub mod codes {
    /// Malformed contract declaration.
    pub const INVALID_CONTRACT: &str = "APISPEC-001-INVALID_CONTRACT";
    /// Declared parameter absent from the exchange.
    pub const MISSING_PARAMETER: &str = "APISPEC-002-MISSING_PARAMETER";
    /// Declared field absent from the exchange.
    pub const MISSING_FIELD: &str = "APISPEC-002-MISSING_FIELD";
    /// Declared link relation absent from the exchange.
    pub const MISSING_LINK: &str = "APISPEC-002-MISSING_LINK";
    /// A body could not be read as JSON.
    pub const UNREADABLE_BODY: &str = "APISPEC-002-UNREADABLE_BODY";
    /// A field value does not match its declared type.
    pub const FIELD_TYPE: &str = "APISPEC-002-FIELD_TYPE";
    /// Body contains fields no descriptor documents.
    pub const UNDOCUMENTED: &str = "APISPEC-002-UNDOCUMENTED";
    /// Same id recorded with a different method or path.
    pub const CONFLICT: &str = "APISPEC-003-CONFLICT";
    /// Nothing was recorded during the run.
    pub const EMPTY: &str = "APISPEC-004-EMPTY";
}

/// Error raised when a contract declaration is malformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid contract{}: {message}", .operation_id.as_ref().map(|id| format!(" for '{id}'")).unwrap_or_default())]
pub struct InvalidContractError {
    /// The reason the declaration was rejected.
    pub message: String,
    /// The operation being declared, when known.
    pub operation_id: Option<String>,
}

impl InvalidContractError {
    /// Creates a new invalid contract error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            operation_id: None,
        }
    }

    /// Attaches the operation id.
    #[must_use]
    pub fn for_operation(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Diagnostics metadata.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        let mut info = ContractErrorInfo::new(codes::INVALID_CONTRACT, self.message.clone());
        if let Some(ref id) = self.operation_id {
            info = info.with_context_entry("operation_id", id.clone());
        }
        info
    }
}

/// Error raised when a declared parameter or header is absent from the exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Operation '{operation_id}'{}: {location} parameter '{name}' not found in exchange", example_suffix(.example_index))]
pub struct MissingParameterError {
    /// The operation being recorded.
    pub operation_id: String,
    /// The parameter name.
    pub name: String,
    /// Where the parameter was expected (path, query, header, response header).
    pub location: String,
    /// Index the example would have had in its operation.
    pub example_index: Option<usize>,
}

/// Error raised when a declared field path does not resolve in a body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Operation '{operation_id}'{}: {part} field '{path}' not found in body", example_suffix(.example_index))]
pub struct MissingFieldError {
    /// The operation being recorded.
    pub operation_id: String,
    /// The declared field path.
    pub path: String,
    /// Which body was searched ("request" or "response").
    pub part: String,
    /// Index the example would have had in its operation.
    pub example_index: Option<usize>,
}

/// Error raised when a declared link relation is absent from the response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Operation '{operation_id}'{}: link '{rel}' not found, available: [{}]", example_suffix(.example_index), .available.join(", "))]
pub struct MissingLinkError {
    /// The operation being recorded.
    pub operation_id: String,
    /// The missing relation.
    pub rel: String,
    /// Relations the response did carry.
    pub available: Vec<String>,
    /// Index the example would have had in its operation.
    pub example_index: Option<usize>,
}

/// Error raised when a body needed for field checks is not JSON.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Operation '{operation_id}'{}: {part} body is not readable as JSON: {reason}", example_suffix(.example_index))]
pub struct UnreadableBodyError {
    /// The operation being recorded.
    pub operation_id: String,
    /// Which body failed ("request" or "response").
    pub part: String,
    /// Parser message.
    pub reason: String,
    /// Index the example would have had in its operation.
    pub example_index: Option<usize>,
}

/// Error raised when a value does not match its declared field type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Operation '{operation_id}'{}: {part} field '{path}' declared as {expected} but was {actual}", example_suffix(.example_index))]
pub struct FieldTypeMismatchError {
    /// The operation being recorded.
    pub operation_id: String,
    /// The declared field path.
    pub path: String,
    /// Which body was searched.
    pub part: String,
    /// The declared type.
    pub expected: String,
    /// The observed type.
    pub actual: String,
    /// Index the example would have had in its operation.
    pub example_index: Option<usize>,
}

/// Error raised in strict mode when a body carries undocumented fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Operation '{operation_id}'{}: undocumented {part} fields: {}", example_suffix(.example_index), .paths.join(", "))]
pub struct UndocumentedFieldsError {
    /// The operation being recorded.
    pub operation_id: String,
    /// Which body was searched.
    pub part: String,
    /// Leaf paths without a descriptor.
    pub paths: Vec<String>,
    /// Index the example would have had in its operation.
    pub example_index: Option<usize>,
}

fn example_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" (example #{i})")).unwrap_or_default()
}

/// An exchange violated its declared contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizationError {
    /// A declared parameter was absent.
    #[error("{0}")]
    MissingParameter(#[from] MissingParameterError),

    /// A declared field was absent.
    #[error("{0}")]
    MissingField(#[from] MissingFieldError),

    /// A declared link was absent.
    #[error("{0}")]
    MissingLink(#[from] MissingLinkError),

    /// A body could not be parsed.
    #[error("{0}")]
    UnreadableBody(#[from] UnreadableBodyError),

    /// A field had the wrong type.
    #[error("{0}")]
    FieldTypeMismatch(#[from] FieldTypeMismatchError),

    /// Undocumented fields were found in strict mode.
    #[error("{0}")]
    UndocumentedFields(#[from] UndocumentedFieldsError),
}

impl NormalizationError {
    /// The operation the failing exchange belonged to.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        match self {
            Self::MissingParameter(e) => &e.operation_id,
            Self::MissingField(e) => &e.operation_id,
            Self::MissingLink(e) => &e.operation_id,
            Self::UnreadableBody(e) => &e.operation_id,
            Self::FieldTypeMismatch(e) => &e.operation_id,
            Self::UndocumentedFields(e) => &e.operation_id,
        }
    }

    /// Returns the error tagged with the example index it was observed at.
    #[must_use]
    pub fn at_example(mut self, index: usize) -> Self {
        let slot = match &mut self {
            Self::MissingParameter(e) => &mut e.example_index,
            Self::MissingField(e) => &mut e.example_index,
            Self::MissingLink(e) => &mut e.example_index,
            Self::UnreadableBody(e) => &mut e.example_index,
            Self::FieldTypeMismatch(e) => &mut e.example_index,
            Self::UndocumentedFields(e) => &mut e.example_index,
        };
        *slot = Some(index);
        self
    }

    /// Diagnostics metadata.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        let (code, subject) = match self {
            Self::MissingParameter(e) => (codes::MISSING_PARAMETER, e.name.clone()),
            Self::MissingField(e) => (codes::MISSING_FIELD, e.path.clone()),
            Self::MissingLink(e) => (codes::MISSING_LINK, e.rel.clone()),
            Self::UnreadableBody(e) => (codes::UNREADABLE_BODY, e.part.clone()),
            Self::FieldTypeMismatch(e) => (codes::FIELD_TYPE, e.path.clone()),
            Self::UndocumentedFields(e) => (codes::UNDOCUMENTED, e.paths.join(",")),
        };
        ContractErrorInfo::new(code, self.to_string())
            .with_context_entry("operation_id", self.operation_id())
            .with_context_entry("subject", subject)
    }
}

/// Error raised when the same operation id is recorded with a different method or path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Conflicting operation '{operation_id}': first recorded as {existing}, now {incoming}")]
pub struct ConflictingOperationError {
    /// The contested operation id.
    pub operation_id: String,
    /// `METHOD /path` of the first recording.
    pub existing: String,
    /// `METHOD /path` of the rejected recording.
    pub incoming: String,
}

impl ConflictingOperationError {
    /// Creates a new conflict error.
    #[must_use]
    pub fn new(
        operation_id: impl Into<String>,
        existing: impl Into<String>,
        incoming: impl Into<String>,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }

    /// Diagnostics metadata.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        ContractErrorInfo::new(codes::CONFLICT, self.to_string())
            .with_context_entry("operation_id", self.operation_id.clone())
            .with_context_entry("existing", self.existing.clone())
            .with_context_entry("incoming", self.incoming.clone())
    }
}

/// Error raised when emitting a registry that recorded nothing.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Default)]
#[error("No operations were recorded during this run")]
pub struct EmptyRegistryError;

impl EmptyRegistryError {
    /// Diagnostics metadata.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        ContractErrorInfo::new(codes::EMPTY, self.to_string())
    }
}

/// Provides default suggestions for error codes.
pub struct ErrorSuggestions;

impl ErrorSuggestions {
    /// Gets a suggestion for a given error code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        match code {
            codes::INVALID_CONTRACT => Some(
                "Give the operation a non-empty description and declare every \
                 parameter, field and link only once.",
            ),
            codes::MISSING_PARAMETER => Some(
                "Send the parameter in the test request, or mark the descriptor optional.",
            ),
            codes::MISSING_FIELD => Some(
                "Check the field path against the actual body, or mark the descriptor \
                 optional or ignored.",
            ),
            codes::MISSING_LINK => Some(
                "Check the relation name, or mark the link descriptor ignored.",
            ),
            codes::UNREADABLE_BODY => Some(
                "Field descriptors need a JSON body; drop the field descriptors for \
                 non-JSON payloads.",
            ),
            codes::FIELD_TYPE => Some("Fix the declared type or the returned value."),
            codes::UNDOCUMENTED => Some(
                "Describe the listed fields, use a subsection descriptor, or disable \
                 fail_on_undocumented_fields.",
            ),
            codes::CONFLICT => Some(
                "Operation ids must be unique per method and path template. \
                 Rename one of the recordings.",
            ),
            codes::EMPTY => Some("Record at least one exchange before emitting."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_error_info_creation() {
        let info = ContractErrorInfo::new(codes::MISSING_FIELD, "Missing")
            .with_context_entry("operation_id", "cart-get");

        assert_eq!(info.code, codes::MISSING_FIELD);
        assert!(info.fix_hint.is_some());
        assert_eq!(info.context.get("operation_id"), Some(&"cart-get".to_string()));
    }

    #[test]
    fn test_missing_field_message_carries_context() {
        let err = NormalizationError::from(MissingFieldError {
            operation_id: "cart-get".to_string(),
            path: "products".to_string(),
            part: "response".to_string(),
            example_index: None,
        })
        .at_example(2);

        let message = err.to_string();
        assert!(message.contains("cart-get"));
        assert!(message.contains("'products'"));
        assert!(message.contains("example #2"));
        assert_eq!(err.operation_id(), "cart-get");
    }

    #[test]
    fn test_conflict_is_fatal() {
        let err: RecorderError =
            ConflictingOperationError::new("cart-order", "POST /carts/{id}/order", "PUT /carts/{id}/order")
                .into();
        assert!(err.is_fatal_for_run());
        assert_eq!(err.error_info().unwrap().code, codes::CONFLICT);
    }

    #[test]
    fn test_invalid_contract_is_not_fatal() {
        let err: RecorderError = InvalidContractError::new("description is required")
            .for_operation("carts-create")
            .into();
        assert!(!err.is_fatal_for_run());
        assert!(err.to_string().contains("for 'carts-create'"));
    }

    #[test]
    fn test_error_suggestions() {
        assert!(ErrorSuggestions::get(codes::CONFLICT).is_some());
        assert!(ErrorSuggestions::get("UNKNOWN").is_none());
    }

    #[test]
    fn test_error_info_to_json() {
        let json = EmptyRegistryError.error_info().to_json();
        assert_eq!(json["code"], codes::EMPTY);
        assert!(json.get("fix_hint").is_some());
        assert!(json.get("context").is_none());
    }
}
