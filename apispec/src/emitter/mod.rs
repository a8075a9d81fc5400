//! Spec emission: turns the registry into a deterministic [`SpecDocument`].

mod document;
mod openapi;
mod persist;
mod schema;
mod swagger;

pub use document::{
    ExampleBody, ExamplePair, ExampleRequest, ExampleResponse, FieldSection, LinkSection,
    OperationSection, ParameterSection, SpecDocument,
};
pub use openapi::{to_openapi, ApiInfo, OAuth2Flow, OAuth2Scheme, OAUTH2_SCHEME_NAME, OPENAPI_VERSION};
pub use persist::{persist_json, write_documents, write_swagger, WrittenDocuments};
pub use swagger::{
    to_swagger, SwaggerDocument, SwaggerHeader, SwaggerInfo, SwaggerOperation, SwaggerParameter,
    SwaggerResponse, SwaggerSchema, SwaggerSecurityDefinition, SwaggerSettings, SwaggerTag,
    SWAGGER_VERSION,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

use crate::contract::{DeclaredField, FieldType, ParameterDescriptor};
use crate::errors::EmptyRegistryError;
use crate::exchange::{parse_json_body, Example};
use crate::operation::RecordedOperation;
use crate::registry::OperationRegistry;

/// What to do when a run recorded nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyRegistryPolicy {
    /// Log a warning and emit an empty document.
    #[default]
    Warn,
    /// Return [`EmptyRegistryError`].
    Fail,
}

/// Emitter options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Examples kept per operation after deduplication.
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
    /// Behaviour for an empty registry.
    #[serde(default)]
    pub empty_registry: EmptyRegistryPolicy,
}

fn default_max_examples() -> usize {
    3
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_examples: default_max_examples(),
            empty_registry: EmptyRegistryPolicy::default(),
        }
    }
}

/// Builds documents from a registry snapshot.
#[derive(Debug, Clone, Default)]
pub struct SpecEmitter {
    config: EmitterConfig,
}

impl SpecEmitter {
    /// Creates an emitter.
    #[must_use]
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Emits every recorded operation in operation id order.
    pub fn emit(&self, registry: &OperationRegistry) -> Result<SpecDocument, EmptyRegistryError> {
        let operations = registry.snapshot();
        if operations.is_empty() {
            return match self.config.empty_registry {
                EmptyRegistryPolicy::Warn => {
                    warn!("No operations were recorded, emitting an empty document");
                    Ok(SpecDocument::new())
                }
                EmptyRegistryPolicy::Fail => Err(EmptyRegistryError),
            };
        }

        let mut document = SpecDocument::new();
        for operation in operations {
            let section = self.section(&operation);
            debug!(
                operation_id = %operation.operation_id,
                recorded = section.example_count,
                kept = section.examples.len(),
                "Emitted operation"
            );
            document.insert(operation.operation_id, section);
        }
        info!(operations = document.len(), "Emitted spec document");
        Ok(document)
    }

    fn section(&self, operation: &RecordedOperation) -> OperationSection {
        let contract = &operation.contract;
        let coverage = operation.combined_coverage();
        let examples: Vec<&Example> = operation.examples.iter().map(|r| &r.example).collect();

        let parameters = contract
            .request_parameters()
            .filter(|p| !p.ignored)
            .map(|p| {
                let example = examples.iter().find_map(|e| {
                    e.request
                        .parameter_value(&operation.path_template, p.location, &p.name)
                });
                parameter_section(p, coverage.has_parameter(p.location, &p.name), example)
            })
            .collect();

        let response_headers = contract
            .response_headers()
            .iter()
            .filter(|h| !h.ignored)
            .map(|h| {
                let example = examples
                    .iter()
                    .find_map(|e| e.response.headers.get(&h.name).map(String::from));
                parameter_section(h, coverage.response_headers.contains(&h.name), example)
            })
            .collect();

        let request_bodies: Vec<Option<Value>> = examples
            .iter()
            .map(|e| parse_json_body(&e.request.body).ok().flatten())
            .collect();
        let response_bodies: Vec<Option<Value>> = examples
            .iter()
            .map(|e| parse_json_body(&e.response.body).ok().flatten())
            .collect();

        let links = contract
            .links()
            .iter()
            .filter(|l| !l.ignored)
            .map(|l| LinkSection {
                rel: l.rel.clone(),
                description: l.description.clone(),
                optional: l.optional,
                observed: coverage.links.contains(&l.rel),
            })
            .collect();

        let status_codes: BTreeSet<u16> = examples.iter().map(|e| e.response.status).collect();

        OperationSection {
            method: operation.method,
            path: operation.path_template.to_string(),
            description: contract.description().to_string(),
            summary: contract.summary().map(String::from),
            tags: contract.tags().to_vec(),
            parameters,
            response_headers,
            request_fields: field_sections(contract.request_fields(), &request_bodies, &coverage.request_fields),
            response_fields: field_sections(contract.response_fields(), &response_bodies, &coverage.response_fields),
            links,
            request_content_type: examples
                .iter()
                .find_map(|e| e.request.content_type().map(String::from)),
            response_content_type: examples
                .iter()
                .find_map(|e| e.response.content_type().map(String::from)),
            status_codes: status_codes.into_iter().collect(),
            example_count: examples.len(),
            examples: self.distinct_examples(&examples),
        }
    }

    fn distinct_examples(&self, examples: &[&Example]) -> Vec<ExamplePair> {
        let mut seen = HashSet::new();
        examples
            .iter()
            .filter(|e| seen.insert(example_fingerprint(e)))
            .take(self.config.max_examples)
            .map(|e| ExamplePair {
                request: ExampleRequest::from(&e.request),
                response: ExampleResponse::from(&e.response),
            })
            .collect()
    }
}

fn parameter_section(
    descriptor: &ParameterDescriptor,
    observed: bool,
    example: Option<String>,
) -> ParameterSection {
    ParameterSection {
        name: descriptor.name.clone(),
        location: descriptor.location,
        description: descriptor.description.clone(),
        optional: descriptor.optional,
        observed,
        example,
    }
}

fn field_sections(
    declared: &[DeclaredField],
    bodies: &[Option<Value>],
    covered: &BTreeSet<String>,
) -> Vec<FieldSection> {
    declared
        .iter()
        .filter(|f| !f.descriptor.ignored)
        .map(|f| FieldSection {
            path: f.descriptor.path.clone(),
            description: f.descriptor.description.clone(),
            field_type: f.descriptor.field_type.or_else(|| observed_type(f, bodies)),
            optional: f.descriptor.optional,
            subsection: f.descriptor.subsection,
            observed: covered.contains(&f.key()),
        })
        .collect()
}

/// Type of the first non-null occurrence across examples in call order.
/// A field only ever seen as null is typed null.
fn observed_type(field: &DeclaredField, bodies: &[Option<Value>]) -> Option<FieldType> {
    let mut seen_null = false;
    for body in bodies.iter().flatten() {
        for value in field.path.resolve(body) {
            if value.is_null() {
                seen_null = true;
            } else {
                return Some(FieldType::of(value));
            }
        }
    }
    seen_null.then_some(FieldType::Null)
}

/// Structural identity of an example: status, request body and response body.
/// JSON bodies compare by value, so formatting differences do not matter.
fn example_fingerprint(example: &Example) -> String {
    let mut hasher = Sha256::new();
    hasher.update(example.response.status.to_be_bytes());
    for body in [&example.request.body, &example.response.body] {
        match parse_json_body(body) {
            Ok(Some(json)) => {
                hasher.update(b"j");
                hasher.update(json.to_string().as_bytes());
            }
            _ => {
                hasher.update(b"r");
                hasher.update((body.len() as u64).to_be_bytes());
                hasher.update(body);
            }
        }
        hasher.update(b"\x00");
    }
    hex::encode(hasher.finalize())
}
