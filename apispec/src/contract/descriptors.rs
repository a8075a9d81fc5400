//! Descriptors for parameters, headers, body fields and hypermedia links.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::path::FieldType;

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// A `{name}` variable of the path template.
    Path,
    /// A query string parameter.
    Query,
    /// A header.
    Header,
}

impl ParameterLocation {
    /// The name used in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared path parameter, query parameter or header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter or header name.
    pub name: String,
    /// Human description.
    #[serde(default)]
    pub description: String,
    /// Where the parameter lives.
    pub location: ParameterLocation,
    /// Whether the parameter may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Whether the parameter is left out of checks and documents.
    #[serde(default)]
    pub ignored: bool,
}

impl ParameterDescriptor {
    fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            location,
            optional: false,
            ignored: false,
        }
    }

    /// Declares a path variable.
    #[must_use]
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Path)
    }

    /// Declares a query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Query)
    }

    /// Declares a header.
    #[must_use]
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Header)
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the parameter optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the parameter ignored.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

/// A declared request or response body field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Dot/bracket path into the body.
    pub path: String,
    /// Human description.
    #[serde(default)]
    pub description: String,
    /// Whether the field may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Whether the field is left out of checks and documents.
    #[serde(default)]
    pub ignored: bool,
    /// Whether the descriptor documents the whole subtree under `path`.
    #[serde(default)]
    pub subsection: bool,
    /// Declared type, inferred from examples when absent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

impl FieldDescriptor {
    /// Declares a field.
    #[must_use]
    pub fn field(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: String::new(),
            optional: false,
            ignored: false,
            subsection: false,
            field_type: None,
        }
    }

    /// Declares a subsection: the field and everything below it.
    #[must_use]
    pub fn subsection(path: impl Into<String>) -> Self {
        Self {
            subsection: true,
            ..Self::field(path)
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the declared type.
    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Marks the field optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the field ignored.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

/// A declared hypermedia link relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    /// Relation name.
    pub rel: String,
    /// Human description.
    #[serde(default)]
    pub description: String,
    /// Whether the link may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Whether the link is left out of checks and documents.
    #[serde(default)]
    pub ignored: bool,
}

impl LinkDescriptor {
    /// Declares a link relation.
    #[must_use]
    pub fn rel(rel: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            description: String::new(),
            optional: false,
            ignored: false,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the link optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the link ignored.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}
