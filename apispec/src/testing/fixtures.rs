//! Test fixtures for recording runs.

use serde_json::Value;
use std::sync::Arc;

use crate::config::RecorderConfig;
use crate::emitter::SpecDocument;
use crate::errors::RecorderError;
use crate::events::CollectingEventSink;
use crate::exchange::{Example, HttpRequest, HttpResponse};
use crate::recorder::Recorder;

/// Builder for an [`Example`].
#[derive(Debug, Clone)]
pub struct TestExchange {
    request: HttpRequest,
    response: HttpResponse,
}

impl TestExchange {
    /// Starts an exchange for `uri` answered with `200`.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            request: HttpRequest::new(uri),
            response: HttpResponse::new(200),
        }
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_request_header(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.with_header(name, value);
        self
    }

    /// Supplies a path variable explicitly.
    #[must_use]
    pub fn with_path_variable(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.with_path_variable(name, value);
        self
    }

    /// Sets a raw request body.
    #[must_use]
    pub fn with_request_body(mut self, body: impl Into<Vec<u8>>, content_type: &str) -> Self {
        self.request = self.request.with_body(body, content_type);
        self
    }

    /// Sets a JSON request body.
    #[must_use]
    pub fn with_request_json(mut self, body: &Value) -> Self {
        self.request = self.request.with_json(body);
        self
    }

    /// Sets the response status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.response.status = status;
        self
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_response_header(mut self, name: &str, value: &str) -> Self {
        self.response = self.response.with_header(name, value);
        self
    }

    /// Sets a JSON response body.
    #[must_use]
    pub fn with_response_json(mut self, body: &Value) -> Self {
        self.response = self.response.with_json(body);
        self
    }

    /// Sets a HAL response body.
    #[must_use]
    pub fn with_hal_response(mut self, body: &Value) -> Self {
        self.response = self.response.with_body(body.to_string(), "application/hal+json");
        self
    }

    /// Builds the example.
    #[must_use]
    pub fn build(self) -> Example {
        Example::new(self.request, self.response)
    }
}

/// A recorder wired to a collecting event sink.
#[derive(Debug)]
pub struct TestRun {
    recorder: Recorder,
    events: Arc<CollectingEventSink>,
}

impl Default for TestRun {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}

impl TestRun {
    /// Creates a run with `config`.
    #[must_use]
    pub fn new(config: RecorderConfig) -> Self {
        let events = Arc::new(CollectingEventSink::new());
        let recorder = Recorder::new(config).with_event_sink(events.clone());
        Self { recorder, events }
    }

    /// The recorder under test.
    #[must_use]
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> &CollectingEventSink {
        &self.events
    }

    /// Finishes the run.
    pub fn finish(&self) -> Result<SpecDocument, RecorderError> {
        self.recorder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exchange_builder() {
        let example = TestExchange::new("/carts/1")
            .with_request_header("Accept", "application/hal+json")
            .with_status(404)
            .with_response_json(&json!({"error": "not found"}))
            .build();

        assert_eq!(example.request.headers.get("accept"), Some("application/hal+json"));
        assert_eq!(example.response.status, 404);
        assert_eq!(example.response.content_type(), Some("application/json"));
    }

    #[test]
    fn test_run_starts_empty() {
        let run = TestRun::default();
        assert!(run.events().is_empty());
        assert!(run.recorder().registry().is_empty());
    }
}
