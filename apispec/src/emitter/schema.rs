//! Body schemas assembled from documented field paths.
//!
//! The tree is shared by the OpenAPI 3 and OpenAPI 2 renditions; each one
//! walks it into its own schema model.

use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use super::document::FieldSection;
use crate::contract::{FieldPath, FieldType, PathSegment};

/// Shape of one node of a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaShape<'a> {
    /// Named properties, with an optional schema for any other key.
    Object {
        properties: &'a BTreeMap<String, SchemaTree>,
        required: &'a BTreeSet<String>,
        additional: Option<&'a SchemaTree>,
    },
    /// Array with an item schema.
    Array(&'a SchemaTree),
    /// Leaf with a declared or observed type, if any.
    Leaf(Option<FieldType>),
}

/// Schema tree of one request or response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SchemaTree {
    field_type: Option<FieldType>,
    description: Option<String>,
    properties: BTreeMap<String, SchemaTree>,
    required: BTreeSet<String>,
    items: Option<Box<SchemaTree>>,
    additional: Option<Box<SchemaTree>>,
}

impl SchemaTree {
    /// Builds the tree of a body from its field sections. Unparseable paths
    /// are skipped with a warning.
    pub(crate) fn from_fields(fields: &[FieldSection]) -> Self {
        let mut root = Self::default();
        for field in fields {
            match FieldPath::parse(&field.path) {
                Ok(path) => root.insert(path.segments(), field),
                Err(err) => warn!(path = %field.path, error = %err, "Skipping unparseable field path"),
            }
        }
        root
    }

    fn insert(&mut self, segments: &[PathSegment], field: &FieldSection) {
        let Some((head, rest)) = segments.split_first() else {
            if field.field_type.is_some() {
                self.field_type = field.field_type;
            }
            self.description = Some(field.description.clone());
            return;
        };
        let child = match head {
            PathSegment::Key(key) => {
                if !field.optional {
                    self.required.insert(key.clone());
                }
                self.properties.entry(key.clone()).or_default()
            }
            PathSegment::AnyIndex | PathSegment::Index(_) => {
                self.items.get_or_insert_with(Box::default).as_mut()
            }
            PathSegment::AnyKey => self.additional.get_or_insert_with(Box::default).as_mut(),
        };
        child.insert(rest, field);
    }

    /// Description of the field this node documents.
    pub(crate) fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Structure of this node. Children win over a declared leaf type.
    pub(crate) fn shape(&self) -> SchemaShape<'_> {
        if !self.properties.is_empty() || self.additional.is_some() {
            SchemaShape::Object {
                properties: &self.properties,
                required: &self.required,
                additional: self.additional.as_deref(),
            }
        } else if let Some(ref items) = self.items {
            SchemaShape::Array(items)
        } else {
            SchemaShape::Leaf(self.field_type)
        }
    }
}
