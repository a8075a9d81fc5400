//! Assertions on emitted documents and recorder errors.

use crate::emitter::{OperationSection, SpecDocument};
use crate::errors::{NormalizationError, RecorderError};

/// Asserts that the document has a section for `operation_id` and returns it.
pub fn assert_documented<'a>(document: &'a SpecDocument, operation_id: &str) -> &'a OperationSection {
    match document.get(operation_id) {
        Some(section) => section,
        None => panic!(
            "Expected operation '{}' to be documented. Documented: {:?}",
            operation_id,
            document.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>()
        ),
    }
}

/// Asserts the number of examples recorded for an operation.
pub fn assert_example_count(document: &SpecDocument, operation_id: &str, expected: usize) {
    let section = assert_documented(document, operation_id);
    assert_eq!(
        section.example_count, expected,
        "Expected {} examples for '{}', got {}",
        expected, operation_id, section.example_count
    );
}

/// Asserts that a request or response field is documented for an operation.
pub fn assert_field_documented(document: &SpecDocument, operation_id: &str, path: &str) {
    let section = assert_documented(document, operation_id);
    let found = section
        .request_fields
        .iter()
        .chain(&section.response_fields)
        .any(|f| f.path == path);
    assert!(found, "Expected field '{path}' to be documented for '{operation_id}'");
}

fn normalization(err: &RecorderError) -> &NormalizationError {
    match err {
        RecorderError::Normalization(inner) => inner,
        other => panic!("Expected a contract violation, got: {other}"),
    }
}

/// Asserts that `err` reports the missing field `path`.
pub fn assert_missing_field(err: &RecorderError, path: &str) {
    match normalization(err) {
        NormalizationError::MissingField(e) => assert_eq!(e.path, path),
        other => panic!("Expected missing field '{path}', got: {other}"),
    }
}

/// Asserts that `err` reports the missing link `rel`.
pub fn assert_missing_link(err: &RecorderError, rel: &str) {
    match normalization(err) {
        NormalizationError::MissingLink(e) => assert_eq!(e.rel, rel),
        other => panic!("Expected missing link '{rel}', got: {other}"),
    }
}

/// Asserts that `err` reports the missing parameter or header `name`.
pub fn assert_missing_parameter(err: &RecorderError, name: &str) {
    match normalization(err) {
        NormalizationError::MissingParameter(e) => assert_eq!(e.name, name),
        other => panic!("Expected missing parameter '{name}', got: {other}"),
    }
}
