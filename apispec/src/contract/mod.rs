//! Contract model: what an operation declares about itself.
//!
//! This module provides:
//! - Parameter, field and link descriptors
//! - Dot/bracket field paths and JSON type inference
//! - The validated, immutable `ContractModel`

mod descriptors;
mod model;
mod path;

pub use descriptors::{FieldDescriptor, LinkDescriptor, ParameterDescriptor, ParameterLocation};
pub use model::{ContractConfig, ContractModel, DeclaredField};
pub use path::{leaf_paths, FieldPath, FieldType, PathSegment};
