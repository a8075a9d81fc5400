//! Contract declarations and the validated, immutable contract model.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::descriptors::{FieldDescriptor, LinkDescriptor, ParameterDescriptor, ParameterLocation};
use super::path::FieldPath;
use crate::errors::InvalidContractError;
use crate::exchange::PathTemplate;

/// Declaration of an operation's contract.
///
/// Every member except `description` may be left empty. Validation
/// happens once, in [`ContractModel::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Operation description. Required.
    pub description: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Grouping tags.
    pub tags: Vec<String>,
    /// Path template variables.
    pub path_parameters: Vec<ParameterDescriptor>,
    /// Query string parameters.
    pub query_parameters: Vec<ParameterDescriptor>,
    /// Request headers.
    pub request_headers: Vec<ParameterDescriptor>,
    /// Response headers.
    pub response_headers: Vec<ParameterDescriptor>,
    /// Request body fields.
    pub request_fields: Vec<FieldDescriptor>,
    /// Response body fields.
    pub response_fields: Vec<FieldDescriptor>,
    /// Hypermedia links of the response.
    pub links: Vec<LinkDescriptor>,
}

impl ContractConfig {
    /// Creates an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds path parameters.
    #[must_use]
    pub fn with_path_parameters(mut self, params: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        self.path_parameters.extend(params);
        self
    }

    /// Adds query parameters.
    #[must_use]
    pub fn with_query_parameters(mut self, params: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        self.query_parameters.extend(params);
        self
    }

    /// Adds request headers.
    #[must_use]
    pub fn with_request_headers(mut self, headers: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        self.request_headers.extend(headers);
        self
    }

    /// Adds response headers.
    #[must_use]
    pub fn with_response_headers(mut self, headers: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        self.response_headers.extend(headers);
        self
    }

    /// Adds request fields.
    #[must_use]
    pub fn with_request_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.request_fields.extend(fields);
        self
    }

    /// Adds response fields.
    #[must_use]
    pub fn with_response_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.response_fields.extend(fields);
        self
    }

    /// Adds links.
    #[must_use]
    pub fn with_links(mut self, links: impl IntoIterator<Item = LinkDescriptor>) -> Self {
        self.links.extend(links);
        self
    }

    /// Validates the declaration.
    pub fn build(self) -> Result<ContractModel, InvalidContractError> {
        ContractModel::new(self)
    }
}

/// A field descriptor together with its parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredField {
    /// The declaration as written.
    pub descriptor: FieldDescriptor,
    /// The parsed path.
    pub path: FieldPath,
}

impl DeclaredField {
    /// Canonical path string, used as the coverage key.
    #[must_use]
    pub fn key(&self) -> String {
        self.path.to_string()
    }
}

/// Validated contract of one operation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractModel {
    description: String,
    summary: Option<String>,
    tags: Vec<String>,
    path_parameters: Vec<ParameterDescriptor>,
    query_parameters: Vec<ParameterDescriptor>,
    request_headers: Vec<ParameterDescriptor>,
    response_headers: Vec<ParameterDescriptor>,
    request_fields: Vec<DeclaredField>,
    response_fields: Vec<DeclaredField>,
    links: Vec<LinkDescriptor>,
}

impl ContractModel {
    /// Validates a declaration into a model.
    pub fn new(config: ContractConfig) -> Result<Self, InvalidContractError> {
        let description = config
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| InvalidContractError::new("description is required"))?;

        check_parameters("path parameter", &config.path_parameters, ParameterLocation::Path)?;
        check_parameters("query parameter", &config.query_parameters, ParameterLocation::Query)?;
        check_parameters("request header", &config.request_headers, ParameterLocation::Header)?;
        check_parameters("response header", &config.response_headers, ParameterLocation::Header)?;
        check_links(&config.links)?;

        Ok(Self {
            description,
            summary: config.summary.filter(|s| !s.trim().is_empty()),
            tags: config.tags,
            path_parameters: config.path_parameters,
            query_parameters: config.query_parameters,
            request_headers: config.request_headers,
            response_headers: config.response_headers,
            request_fields: declare_fields("request", config.request_fields)?,
            response_fields: declare_fields("response", config.response_fields)?,
            links: config.links,
        })
    }

    /// A contract that only carries a description.
    pub fn describe(description: impl Into<String>) -> Result<Self, InvalidContractError> {
        ContractConfig::new().with_description(description).build()
    }

    /// Operation description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Short summary, if declared.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Grouping tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Path template variables.
    #[must_use]
    pub fn path_parameters(&self) -> &[ParameterDescriptor] {
        &self.path_parameters
    }

    /// Query parameters.
    #[must_use]
    pub fn query_parameters(&self) -> &[ParameterDescriptor] {
        &self.query_parameters
    }

    /// Request headers.
    #[must_use]
    pub fn request_headers(&self) -> &[ParameterDescriptor] {
        &self.request_headers
    }

    /// Response headers.
    #[must_use]
    pub fn response_headers(&self) -> &[ParameterDescriptor] {
        &self.response_headers
    }

    /// All request-side parameters: path, query, then headers.
    pub fn request_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.path_parameters
            .iter()
            .chain(&self.query_parameters)
            .chain(&self.request_headers)
    }

    /// Request body fields.
    #[must_use]
    pub fn request_fields(&self) -> &[DeclaredField] {
        &self.request_fields
    }

    /// Response body fields.
    #[must_use]
    pub fn response_fields(&self) -> &[DeclaredField] {
        &self.response_fields
    }

    /// Hypermedia links.
    #[must_use]
    pub fn links(&self) -> &[LinkDescriptor] {
        &self.links
    }

    /// Checks that every declared path parameter is a variable of
    /// `template`. Template variables left undeclared are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error naming the declared parameters the template lacks.
    pub fn check_template(&self, template: &PathTemplate) -> Result<(), InvalidContractError> {
        let missing: Vec<&str> = self
            .path_parameters
            .iter()
            .map(|param| param.name.as_str())
            .filter(|name| !template.variables().iter().any(|var| var == name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(InvalidContractError::new(format!(
            "path parameters [{}] are not variables of path template '{template}'",
            missing.join(", ")
        )))
    }
}

fn check_parameters(
    kind: &str,
    params: &[ParameterDescriptor],
    expected: ParameterLocation,
) -> Result<(), InvalidContractError> {
    let mut seen = HashSet::new();
    for param in params {
        if param.name.trim().is_empty() {
            return Err(InvalidContractError::new(format!("{kind} with an empty name")));
        }
        if param.location != expected {
            return Err(InvalidContractError::new(format!(
                "{kind} '{}' is declared as a {} parameter",
                param.name, param.location
            )));
        }
        if !param.ignored && param.description.trim().is_empty() {
            return Err(InvalidContractError::new(format!(
                "{kind} '{}' has no description",
                param.name
            )));
        }
        // Header names compare case-insensitively.
        let key = if expected == ParameterLocation::Header {
            param.name.to_ascii_lowercase()
        } else {
            param.name.clone()
        };
        if !seen.insert(key) {
            return Err(InvalidContractError::new(format!(
                "{kind} '{}' is declared twice",
                param.name
            )));
        }
    }
    Ok(())
}

fn check_links(links: &[LinkDescriptor]) -> Result<(), InvalidContractError> {
    let mut seen = HashSet::new();
    for link in links {
        if link.rel.trim().is_empty() {
            return Err(InvalidContractError::new("link with an empty relation"));
        }
        if !link.ignored && link.description.trim().is_empty() {
            return Err(InvalidContractError::new(format!(
                "link '{}' has no description",
                link.rel
            )));
        }
        if !seen.insert(link.rel.as_str()) {
            return Err(InvalidContractError::new(format!(
                "link '{}' is declared twice",
                link.rel
            )));
        }
    }
    Ok(())
}

fn declare_fields(
    part: &str,
    fields: Vec<FieldDescriptor>,
) -> Result<Vec<DeclaredField>, InvalidContractError> {
    let mut seen = HashSet::new();
    let mut declared = Vec::with_capacity(fields.len());
    for descriptor in fields {
        let path = FieldPath::parse(&descriptor.path)?;
        if !descriptor.ignored && descriptor.description.trim().is_empty() {
            return Err(InvalidContractError::new(format!(
                "{part} field '{}' has no description",
                descriptor.path
            )));
        }
        if !seen.insert(path.clone()) {
            return Err(InvalidContractError::new(format!(
                "{part} field '{}' is declared twice",
                descriptor.path
            )));
        }
        declared.push(DeclaredField { descriptor, path });
    }
    Ok(declared)
}
