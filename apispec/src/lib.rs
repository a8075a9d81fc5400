//! # apispec
//!
//! Records API documentation from the HTTP exchanges a test suite performs.
//!
//! For every exchange the harness hands over an operation id, the method,
//! the path template, a declared contract and the observed request and
//! response. The recorder:
//!
//! - **Validates** the exchange against the contract (parameters, headers,
//!   body fields, hypermedia links)
//! - **Merges** it into a concurrent per-run registry of operations
//! - **Emits** a deterministic interchange document and an OpenAPI 3
//!   rendition at the end of the run, plus an optional OpenAPI 2 one
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apispec::prelude::*;
//!
//! let recorder = Recorder::new(RecorderConfig::default());
//! let contract = ContractConfig::new()
//!     .with_description("Get a cart by id")
//!     .with_path_parameters([ParameterDescriptor::path("id").with_description("the cart id")])
//!     .with_response_fields([FieldDescriptor::field("total").with_description("Total amount")])
//!     .build()?;
//!
//! recorder.record("cart-get", HttpMethod::Get, "/carts/{id}", &Arc::new(contract), example)?;
//! let (document, files) = recorder.finish_and_write()?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod contract;
pub mod emitter;
pub mod errors;
pub mod events;
pub mod exchange;
pub mod links;
pub mod normalizer;
pub mod observability;
pub mod operation;
pub mod recorder;
pub mod registry;
pub mod testing;


/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::RecorderConfig;
    pub use crate::contract::{
        ContractConfig, ContractModel, FieldDescriptor, FieldType, LinkDescriptor,
        ParameterDescriptor, ParameterLocation,
    };
    pub use crate::emitter::{
        to_openapi, to_swagger, write_documents, write_swagger, ApiInfo, EmitterConfig,
        EmptyRegistryPolicy, OAuth2Flow, OAuth2Scheme, SpecDocument, SpecEmitter, SwaggerSettings,
    };
    pub use crate::errors::{
        ConflictingOperationError, ContractErrorInfo, EmptyRegistryError, InvalidContractError,
        NormalizationError, RecorderError,
    };
    pub use crate::events::{CollectingEventSink, LoggingEventSink, NoOpEventSink, RecorderEventSink};
    pub use crate::exchange::{Example, HttpMethod, HttpRequest, HttpResponse, OperationId, PathTemplate};
    pub use crate::links::{ContentTypeLinkExtractor, HalLinkExtractor, LinkExtractor};
    pub use crate::normalizer::{ExchangeNormalizer, NormalizerConfig};
    pub use crate::operation::RecordedOperation;
    pub use crate::recorder::Recorder;
    pub use crate::registry::OperationRegistry;
}
