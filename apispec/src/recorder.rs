//! A documentation run: normalizer, registry, emitter and event sink wired together.

use parking_lot::Mutex;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RecorderConfig;
use crate::contract::{ContractConfig, ContractModel};
use crate::emitter::{write_documents, write_swagger, SpecDocument, SpecEmitter, WrittenDocuments};
use crate::errors::{ConflictingOperationError, RecorderError};
use crate::events::{event_types, NoOpEventSink, RecorderEventSink};
use crate::exchange::{Example, HttpMethod, OperationId, PathTemplate};
use crate::links::LinkExtractor;
use crate::normalizer::ExchangeNormalizer;
use crate::registry::OperationRegistry;

/// One documentation run.
///
/// Safe to share between test threads. Once a conflicting operation id is
/// seen, [`Recorder::finish`] refuses to emit.
pub struct Recorder {
    run_id: Uuid,
    config: RecorderConfig,
    normalizer: ExchangeNormalizer,
    registry: Arc<OperationRegistry>,
    emitter: SpecEmitter,
    sink: Arc<dyn RecorderEventSink>,
    conflicts: Mutex<Vec<ConflictingOperationError>>,
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("run_id", &self.run_id)
            .field("config", &self.config)
            .field("operations", &self.registry.len())
            .field("conflicts", &self.conflicts.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}

impl Recorder {
    /// Creates a run with its own empty registry.
    #[must_use]
    pub fn new(config: RecorderConfig) -> Self {
        let run_id = Uuid::new_v4();
        debug!(run_id = %run_id, "Starting recorder run");
        Self {
            run_id,
            normalizer: ExchangeNormalizer::new(config.normalizer.clone()),
            emitter: SpecEmitter::new(config.emitter_config()),
            registry: OperationRegistry::shared(),
            sink: Arc::new(NoOpEventSink),
            conflicts: Mutex::new(Vec::new()),
            config,
        }
    }

    /// Records into an existing registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<OperationRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Sends events to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn RecorderEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the link extraction strategy.
    #[must_use]
    pub fn with_link_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.normalizer = self.normalizer.with_link_extractor(extractor);
        self
    }

    /// Id of this run, attached to its log lines.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// The registry being recorded into.
    #[must_use]
    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Conflicts seen so far.
    #[must_use]
    pub fn conflicts(&self) -> Vec<ConflictingOperationError> {
        self.conflicts.lock().clone()
    }

    /// Validates one exchange against `contract` and records it.
    ///
    /// On error the registry is unchanged. Contract violations only affect
    /// this exchange; a conflict also poisons [`Recorder::finish`].
    pub fn record(
        &self,
        operation_id: &str,
        method: HttpMethod,
        path_template: &str,
        contract: &Arc<ContractModel>,
        example: Example,
    ) -> Result<(), RecorderError> {
        let (id, template) = match parse_target(operation_id, path_template) {
            Ok(parsed) => parsed,
            Err(err) => return Err(self.reject(operation_id, err)),
        };
        if let Err(err) = contract.check_template(&template) {
            return Err(self.reject(operation_id, err.for_operation(operation_id).into()));
        }

        let index = self.registry.examples_for(id.as_str());
        let status = example.response.status;
        let operation = match self.normalizer.normalize(&id, method, &template, contract, example) {
            Ok(operation) => operation,
            Err(err) => return Err(self.reject(operation_id, err.at_example(index).into())),
        };

        if let Err(conflict) = self.registry.merge(operation) {
            warn!(
                run_id = %self.run_id,
                operation_id = %id,
                error = %conflict,
                "Conflicting operation, this run will not emit"
            );
            self.sink.emit(
                event_types::OPERATION_CONFLICT,
                Some(conflict.error_info().to_json()),
            );
            self.conflicts.lock().push(conflict.clone());
            return Err(conflict.into());
        }

        debug!(
            run_id = %self.run_id,
            operation_id = %id,
            method = %method,
            path = %template,
            example_index = index,
            "Recorded exchange"
        );
        self.sink.emit(
            event_types::OPERATION_RECORDED,
            Some(json!({
                "operation_id": id.as_str(),
                "method": method.as_str(),
                "path": template.as_str(),
                "status": status,
                "example_index": index,
            })),
        );
        Ok(())
    }

    /// Builds the contract from `config`, then records the exchange.
    pub fn document(
        &self,
        operation_id: &str,
        method: HttpMethod,
        path_template: &str,
        config: ContractConfig,
        example: Example,
    ) -> Result<(), RecorderError> {
        let contract = match ContractModel::new(config) {
            Ok(contract) => Arc::new(contract),
            Err(err) => return Err(self.reject(operation_id, err.for_operation(operation_id).into())),
        };
        self.record(operation_id, method, path_template, &contract, example)
    }

    /// Emits the document for everything recorded so far.
    pub fn finish(&self) -> Result<SpecDocument, RecorderError> {
        if let Some(conflict) = self.conflicts.lock().first() {
            warn!(
                run_id = %self.run_id,
                operation_id = %conflict.operation_id,
                "Refusing to emit after a conflicting operation"
            );
            return Err(conflict.clone().into());
        }

        let document = match self.emitter.emit(&self.registry) {
            Ok(document) => document,
            Err(err) => {
                self.sink.emit(event_types::SPEC_EMPTY, Some(err.error_info().to_json()));
                return Err(err.into());
            }
        };

        if document.is_empty() {
            self.sink.emit(event_types::SPEC_EMPTY, None);
        } else {
            self.sink.emit(
                event_types::SPEC_EMITTED,
                Some(json!({
                    "operations": document.len(),
                    "examples": self.registry.example_count(),
                })),
            );
        }
        info!(
            run_id = %self.run_id,
            operations = document.len(),
            "Finished recorder run"
        );
        Ok(document)
    }

    /// Emits and writes the documents under the configured output directory,
    /// including the OpenAPI 2 rendition when one is configured.
    pub fn finish_and_write(&self) -> Result<(SpecDocument, WrittenDocuments), RecorderError> {
        let document = self.finish()?;
        let info = self.config.api_info();
        let mut written = write_documents(&document, &info, &self.config.output_directory, &self.config.prefix)?;
        if let Some(ref settings) = self.config.swagger {
            written.swagger = Some(write_swagger(&document, &info, settings, &self.config.output_directory)?);
        }
        Ok((document, written))
    }

    fn reject(&self, operation_id: &str, err: RecorderError) -> RecorderError {
        warn!(
            run_id = %self.run_id,
            operation_id = %operation_id,
            error = %err,
            "Rejected exchange"
        );
        let data = err.error_info().map(|info| info.to_json());
        self.sink.emit(event_types::OPERATION_REJECTED, data);
        err
    }
}

fn parse_target(operation_id: &str, path_template: &str) -> Result<(OperationId, PathTemplate), RecorderError> {
    let id = OperationId::new(operation_id)?;
    let template = PathTemplate::new(path_template).map_err(|e| e.for_operation(operation_id))?;
    Ok((id, template))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{FieldDescriptor, ParameterDescriptor};
    use crate::emitter::EmptyRegistryPolicy;
    use crate::events::CollectingEventSink;
    use crate::exchange::{HttpRequest, HttpResponse};

    fn created() -> Example {
        Example::new(
            HttpRequest::new("/carts"),
            HttpResponse::new(201).with_header("Location", "http://localhost/carts/1"),
        )
    }

    #[test]
    fn test_record_and_finish() {
        let sink = Arc::new(CollectingEventSink::new());
        let recorder = Recorder::default().with_event_sink(sink.clone());
        let contract = Arc::new(ContractModel::describe("Create a cart").unwrap());

        recorder
            .record("carts-create", HttpMethod::Post, "/carts", &contract, created())
            .unwrap();
        let doc = recorder.finish().unwrap();

        assert_eq!(doc.len(), 1);
        assert_eq!(
            sink.event_types(),
            vec![event_types::OPERATION_RECORDED, event_types::SPEC_EMITTED]
        );
    }

    #[test]
    fn test_invalid_contract_skips_operation() {
        let sink = Arc::new(CollectingEventSink::new());
        let recorder = Recorder::default().with_event_sink(sink.clone());

        let err = recorder
            .document("carts-create", HttpMethod::Post, "/carts", ContractConfig::new(), created())
            .unwrap_err();
        assert!(matches!(err, RecorderError::InvalidContract(ref e) if e.operation_id.as_deref() == Some("carts-create")));
        assert!(recorder.registry().is_empty());
        assert_eq!(sink.event_types(), vec![event_types::OPERATION_REJECTED]);
    }

    #[test]
    fn test_invalid_template_rejected() {
        let recorder = Recorder::default();
        let contract = Arc::new(ContractModel::describe("Create a cart").unwrap());
        let err = recorder
            .record("carts-create", HttpMethod::Post, "carts", &contract, created())
            .unwrap_err();
        assert!(matches!(err, RecorderError::InvalidContract(_)));
        assert!(recorder.record("", HttpMethod::Post, "/carts", &contract, created()).is_err());
    }

    #[test]
    fn test_path_parameter_missing_from_template_rejected() {
        let sink = Arc::new(CollectingEventSink::new());
        let recorder = Recorder::default().with_event_sink(sink.clone());
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("Get a cart by id")
                .with_path_parameters([ParameterDescriptor::path("id").with_description("The cart id")])
                .build()
                .unwrap(),
        );
        let example = || Example::new(HttpRequest::new("/carts/1"), HttpResponse::new(200));

        let err = recorder
            .record("carts-get", HttpMethod::Get, "/carts/{cartId}", &contract, example())
            .unwrap_err();
        assert!(matches!(err, RecorderError::InvalidContract(ref e) if e.operation_id.as_deref() == Some("carts-get")));
        assert!(recorder.registry().is_empty());
        assert_eq!(sink.event_types(), vec![event_types::OPERATION_REJECTED]);

        recorder
            .record("carts-get", HttpMethod::Get, "/carts/{id}", &contract, example())
            .unwrap();
        assert_eq!(recorder.registry().len(), 1);
    }

    #[test]
    fn test_violation_carries_example_index() {
        let recorder = Recorder::default();
        let config = || {
            ContractConfig::new()
                .with_description("Create a cart")
                .with_response_headers([ParameterDescriptor::header("Location").with_description("Cart uri")])
        };

        recorder
            .document("carts-create", HttpMethod::Post, "/carts", config(), created())
            .unwrap();
        let err = recorder
            .document(
                "carts-create",
                HttpMethod::Post,
                "/carts",
                config(),
                Example::new(HttpRequest::new("/carts"), HttpResponse::new(201)),
            )
            .unwrap_err();

        match err {
            RecorderError::Normalization(e) => {
                assert!(e.to_string().contains("example #1"));
                assert_eq!(e.operation_id(), "carts-create");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(recorder.registry().example_count(), 1);
    }

    #[test]
    fn test_conflict_blocks_finish() {
        let sink = Arc::new(CollectingEventSink::new());
        let recorder = Recorder::default().with_event_sink(sink.clone());
        let contract = Arc::new(ContractModel::describe("Order a cart").unwrap());
        let example = || Example::new(HttpRequest::new("/carts/1/order"), HttpResponse::new(200));

        recorder
            .record("cart-order", HttpMethod::Post, "/carts/{id}/order", &contract, example())
            .unwrap();
        let err = recorder
            .record("cart-order", HttpMethod::Put, "/carts/{id}/order", &contract, example())
            .unwrap_err();
        assert!(err.is_fatal_for_run());
        assert_eq!(recorder.conflicts().len(), 1);
        assert_eq!(sink.events_of_type(event_types::OPERATION_CONFLICT).len(), 1);

        let finish = recorder.finish().unwrap_err();
        assert!(matches!(finish, RecorderError::ConflictingOperation(ref c) if c.operation_id == "cart-order"));
    }

    #[test]
    fn test_empty_run_policies() {
        let sink = Arc::new(CollectingEventSink::new());
        let recorder = Recorder::default().with_event_sink(sink.clone());
        assert!(recorder.finish().unwrap().is_empty());
        assert_eq!(sink.event_types(), vec![event_types::SPEC_EMPTY]);

        let strict = Recorder::new(RecorderConfig::new().with_empty_registry(EmptyRegistryPolicy::Fail));
        assert!(matches!(strict.finish(), Err(RecorderError::EmptyRegistry(_))));
    }

    #[test]
    fn test_shared_registry() {
        let registry = OperationRegistry::shared();
        let first = Recorder::default().with_registry(Arc::clone(&registry));
        let second = Recorder::default().with_registry(Arc::clone(&registry));
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("Create a product")
                .with_request_fields([FieldDescriptor::field("name").with_description("Name")])
                .build()
                .unwrap(),
        );
        let example = || {
            Example::new(
                HttpRequest::new("/products").with_json(&serde_json::json!({"name": "Fancy pants"})),
                HttpResponse::new(201),
            )
        };

        first.record("products-create", HttpMethod::Post, "/products", &contract, example()).unwrap();
        second.record("products-create", HttpMethod::Post, "/products", &contract, example()).unwrap();
        assert_eq!(registry.examples_for("products-create"), 2);
        assert_ne!(first.run_id(), second.run_id());
    }
}
