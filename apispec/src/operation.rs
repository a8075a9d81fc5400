//! Recorded operations: a contract plus the examples observed against it.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::contract::{ContractModel, ParameterLocation};
use crate::exchange::{Example, HttpMethod, OperationId, PathTemplate};

/// Which declared descriptors one example exercised.
///
/// Ignored descriptors never appear. Optional descriptors appear only when
/// the example carried them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    /// Request parameters as `location:name` (`path:id`, `header:Content-Type`).
    pub parameters: BTreeSet<String>,
    /// Response headers by declared name.
    pub response_headers: BTreeSet<String>,
    /// Request field paths.
    pub request_fields: BTreeSet<String>,
    /// Response field paths.
    pub response_fields: BTreeSet<String>,
    /// Link relations.
    pub links: BTreeSet<String>,
    /// Request body leaves no descriptor documents.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub undocumented_request_fields: Vec<String>,
    /// Response body leaves no descriptor documents.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub undocumented_response_fields: Vec<String>,
}

impl Coverage {
    /// Coverage key of a request parameter.
    #[must_use]
    pub fn parameter_key(location: ParameterLocation, name: &str) -> String {
        format!("{location}:{name}")
    }

    /// True when the request parameter was exercised.
    #[must_use]
    pub fn has_parameter(&self, location: ParameterLocation, name: &str) -> bool {
        self.parameters.contains(&Self::parameter_key(location, name))
    }

    /// Total number of exercised descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
            + self.response_headers.len()
            + self.request_fields.len()
            + self.response_fields.len()
            + self.links.len()
    }

    /// True when nothing declared was exercised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An example and the coverage it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedExample {
    /// The observed exchange.
    pub example: Example,
    /// What it exercised.
    pub coverage: Coverage,
}

/// One operation with every example recorded against it, in call order.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedOperation {
    /// Caller-assigned id.
    pub operation_id: OperationId,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template.
    pub path_template: PathTemplate,
    /// The declared contract, shared with the caller.
    #[serde(serialize_with = "serialize_description")]
    pub contract: Arc<ContractModel>,
    /// Examples in insertion order.
    pub examples: Vec<RecordedExample>,
}

impl RecordedOperation {
    /// Creates an operation with a single example.
    #[must_use]
    pub fn new(
        operation_id: OperationId,
        method: HttpMethod,
        path_template: PathTemplate,
        contract: Arc<ContractModel>,
        example: RecordedExample,
    ) -> Self {
        Self {
            operation_id,
            method,
            path_template,
            contract,
            examples: vec![example],
        }
    }

    /// `METHOD /template`, as used in conflict reports.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.path_template)
    }

    /// Union of the coverage of every example.
    #[must_use]
    pub fn combined_coverage(&self) -> Coverage {
        let mut combined = Coverage::default();
        for recorded in &self.examples {
            let c = &recorded.coverage;
            combined.parameters.extend(c.parameters.iter().cloned());
            combined.response_headers.extend(c.response_headers.iter().cloned());
            combined.request_fields.extend(c.request_fields.iter().cloned());
            combined.response_fields.extend(c.response_fields.iter().cloned());
            combined.links.extend(c.links.iter().cloned());
        }
        combined
    }
}

fn serialize_description<S>(contract: &Arc<ContractModel>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(contract.description())
}
