//! Exchange normalization: validates one observed exchange against its
//! contract and turns it into a `RecordedOperation`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::contract::{leaf_paths, ContractModel, DeclaredField, FieldType, ParameterLocation};
use crate::errors::{
    FieldTypeMismatchError, MissingFieldError, MissingLinkError, MissingParameterError,
    NormalizationError, UndocumentedFieldsError, UnreadableBodyError,
};
use crate::exchange::{parse_json_body, Example, HttpMethod, OperationId, PathTemplate};
use crate::links::{ContentTypeLinkExtractor, LinkExtractor};
use crate::operation::{Coverage, RecordedExample, RecordedOperation};

/// Normalizer options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Check values against declared field types.
    #[serde(default)]
    pub validate_field_types: bool,
    /// Reject bodies with fields no descriptor documents.
    #[serde(default)]
    pub fail_on_undocumented_fields: bool,
}

impl NormalizerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables declared type checks.
    #[must_use]
    pub fn with_field_type_validation(mut self) -> Self {
        self.validate_field_types = true;
        self
    }

    /// Enables strict undocumented field checks.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.fail_on_undocumented_fields = true;
        self
    }
}

/// Which body a field check runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyPart {
    Request,
    Response,
}

impl BodyPart {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

/// Validates exchanges against contracts.
#[derive(Clone)]
pub struct ExchangeNormalizer {
    config: NormalizerConfig,
    link_extractor: Arc<dyn LinkExtractor>,
}

impl fmt::Debug for ExchangeNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeNormalizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ExchangeNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl ExchangeNormalizer {
    /// Creates a normalizer that picks link extraction by content type.
    #[must_use]
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config,
            link_extractor: Arc::new(ContentTypeLinkExtractor::new()),
        }
    }

    /// Replaces the link extraction strategy.
    #[must_use]
    pub fn with_link_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.link_extractor = extractor;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Validates `example` against `contract` and records it.
    pub fn normalize(
        &self,
        operation_id: &OperationId,
        method: HttpMethod,
        path_template: &PathTemplate,
        contract: &Arc<ContractModel>,
        example: Example,
    ) -> Result<RecordedOperation, NormalizationError> {
        debug!(
            operation_id = %operation_id,
            method = %method,
            path = %path_template,
            status = example.response.status,
            "Normalizing exchange"
        );

        let mut coverage = Coverage::default();

        self.check_parameters(operation_id, path_template, contract, &example, &mut coverage)?;

        let request_body = self.check_fields(
            operation_id,
            BodyPart::Request,
            contract.request_fields(),
            &example.request.body,
            &mut coverage,
        )?;
        if let Some(undocumented) = request_body {
            coverage.undocumented_request_fields = undocumented;
        }

        // Response fields only apply when there is a response body.
        if !example.response.body.iter().all(u8::is_ascii_whitespace) {
            let response_body = self.check_fields(
                operation_id,
                BodyPart::Response,
                contract.response_fields(),
                &example.response.body,
                &mut coverage,
            )?;
            if let Some(undocumented) = response_body {
                coverage.undocumented_response_fields = undocumented;
            }
        }

        self.check_links(operation_id, contract, &example, &mut coverage)?;

        debug!(
            operation_id = %operation_id,
            exercised = coverage.len(),
            "Exchange satisfies contract"
        );

        Ok(RecordedOperation::new(
            operation_id.clone(),
            method,
            path_template.clone(),
            Arc::clone(contract),
            RecordedExample { example, coverage },
        ))
    }

    fn check_parameters(
        &self,
        operation_id: &OperationId,
        path_template: &PathTemplate,
        contract: &ContractModel,
        example: &Example,
        coverage: &mut Coverage,
    ) -> Result<(), NormalizationError> {
        let request = &example.request;
        let path_values = request.resolve_path_variables(path_template);
        let query = request.query_parameters();

        for param in contract.request_parameters().filter(|p| !p.ignored) {
            let present = match param.location {
                ParameterLocation::Path => path_values.contains_key(&param.name),
                ParameterLocation::Query => query.contains_key(&param.name),
                ParameterLocation::Header => request.headers.contains(&param.name),
            };
            if present {
                coverage
                    .parameters
                    .insert(Coverage::parameter_key(param.location, &param.name));
            } else if !param.optional {
                return Err(MissingParameterError {
                    operation_id: operation_id.to_string(),
                    name: param.name.clone(),
                    location: param.location.to_string(),
                    example_index: None,
                }
                .into());
            }
        }

        for header in contract.response_headers().iter().filter(|h| !h.ignored) {
            if example.response.headers.contains(&header.name) {
                coverage.response_headers.insert(header.name.clone());
            } else if !header.optional {
                return Err(MissingParameterError {
                    operation_id: operation_id.to_string(),
                    name: header.name.clone(),
                    location: "response header".to_string(),
                    example_index: None,
                }
                .into());
            }
        }

        Ok(())
    }

    /// Checks declared fields against one body. Returns the undocumented
    /// leaves when the body was JSON and the part declares fields.
    fn check_fields(
        &self,
        operation_id: &OperationId,
        part: BodyPart,
        declared: &[DeclaredField],
        body: &[u8],
        coverage: &mut Coverage,
    ) -> Result<Option<Vec<String>>, NormalizationError> {
        if declared.is_empty() {
            return Ok(None);
        }

        let json = parse_json_body(body).map_err(|e| UnreadableBodyError {
            operation_id: operation_id.to_string(),
            part: part.as_str().to_string(),
            reason: e.to_string(),
            example_index: None,
        })?;
        let json = json.unwrap_or(Value::Null);

        for field in declared.iter().filter(|f| !f.descriptor.ignored) {
            let matches = field.path.resolve(&json);
            if matches.is_empty() {
                if field.descriptor.optional {
                    continue;
                }
                return Err(MissingFieldError {
                    operation_id: operation_id.to_string(),
                    path: field.descriptor.path.clone(),
                    part: part.as_str().to_string(),
                    example_index: None,
                }
                .into());
            }

            if self.config.validate_field_types {
                if let Some(expected) = field.descriptor.field_type {
                    if let Some(bad) = matches.iter().find(|v| !expected.accepts(v)) {
                        return Err(FieldTypeMismatchError {
                            operation_id: operation_id.to_string(),
                            path: field.descriptor.path.clone(),
                            part: part.as_str().to_string(),
                            expected: expected.to_string(),
                            actual: FieldType::of(bad).to_string(),
                            example_index: None,
                        }
                        .into());
                    }
                }
            }

            let key = field.key();
            match part {
                BodyPart::Request => coverage.request_fields.insert(key),
                BodyPart::Response => coverage.response_fields.insert(key),
            };
        }

        let undocumented = undocumented_leaves(&json, declared);
        if self.config.fail_on_undocumented_fields && !undocumented.is_empty() {
            return Err(UndocumentedFieldsError {
                operation_id: operation_id.to_string(),
                part: part.as_str().to_string(),
                paths: undocumented,
                example_index: None,
            }
            .into());
        }
        Ok(Some(undocumented))
    }

    fn check_links(
        &self,
        operation_id: &OperationId,
        contract: &ContractModel,
        example: &Example,
        coverage: &mut Coverage,
    ) -> Result<(), NormalizationError> {
        if contract.links().is_empty() {
            return Ok(());
        }

        let response = &example.response;
        let Some(links) = self
            .link_extractor
            .extract_links(response.content_type(), &response.body)
        else {
            debug!(
                operation_id = %operation_id,
                content_type = ?response.content_type(),
                "Response has no hypermedia support, skipping link checks"
            );
            return Ok(());
        };

        let available: BTreeSet<&str> = links.iter().map(|l| l.rel.as_str()).collect();
        for link in contract.links().iter().filter(|l| !l.ignored) {
            if available.contains(link.rel.as_str()) {
                coverage.links.insert(link.rel.clone());
            } else if !link.optional {
                return Err(MissingLinkError {
                    operation_id: operation_id.to_string(),
                    rel: link.rel.clone(),
                    available: available.iter().map(|r| (*r).to_string()).collect(),
                    example_index: None,
                }
                .into());
            }
        }
        Ok(())
    }
}

fn undocumented_leaves(json: &Value, declared: &[DeclaredField]) -> Vec<String> {
    leaf_paths(json)
        .into_iter()
        .filter(|leaf| {
            !declared.iter().any(|field| {
                let subtree = field.descriptor.subsection || field.descriptor.ignored;
                field.path.covers(leaf, subtree)
            })
        })
        .map(|leaf| leaf.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractConfig, FieldDescriptor, LinkDescriptor, ParameterDescriptor};
    use crate::exchange::{HttpRequest, HttpResponse};
    use crate::links::{Link, MockLinkExtractor, NoLinkExtractor};
    use serde_json::json;

    fn id(s: &str) -> OperationId {
        OperationId::new(s).unwrap()
    }

    fn template(s: &str) -> PathTemplate {
        PathTemplate::new(s).unwrap()
    }

    fn cart_body() -> Value {
        json!({
            "total": 10.5,
            "products": [
                {"quantity": 1,
                 "product": {"name": "Fancy pants", "price": 10.5},
                 "_links": {"product": {"href": "http://localhost/products/1"}}}
            ],
            "_links": {
                "self": {"href": "http://localhost/carts/1"},
                "order": {"href": "http://localhost/carts/1/order"}
            }
        })
    }

    fn cart_get_contract() -> Arc<ContractModel> {
        Arc::new(
            ContractConfig::new()
                .with_description("Get a cart by id")
                .with_path_parameters([ParameterDescriptor::path("id").with_description("the cart id")])
                .with_response_fields([
                    FieldDescriptor::field("total").with_description("Total amount of the cart."),
                    FieldDescriptor::field("products").with_description("The product line item of the cart."),
                    FieldDescriptor::subsection("products[]._links.product").with_description("Link to the product."),
                    FieldDescriptor::field("products[].quantity").with_description("The quantity of the line item."),
                    FieldDescriptor::subsection("products[].product").with_description("The product the line item relates to."),
                    FieldDescriptor::subsection("_links").with_description("Links section."),
                ])
                .with_links([
                    LinkDescriptor::rel("self").ignored(),
                    LinkDescriptor::rel("order").with_description("Link to order the cart."),
                ])
                .build()
                .unwrap(),
        )
    }

    fn hal_response(body: &Value) -> HttpResponse {
        HttpResponse::new(200).with_body(body.to_string(), "application/hal+json")
    }

    #[test]
    fn test_description_only_contract() {
        let contract = Arc::new(ContractModel::describe("Create a cart").unwrap());
        let example = Example::new(
            HttpRequest::new("/carts"),
            HttpResponse::new(201).with_header("Location", "/carts/42"),
        );

        let op = ExchangeNormalizer::default()
            .normalize(&id("carts-create"), HttpMethod::Post, &template("/carts"), &contract, example)
            .unwrap();

        assert_eq!(op.examples.len(), 1);
        assert!(op.examples[0].coverage.is_empty());
        assert_eq!(op.signature(), "POST /carts");
    }

    #[test]
    fn test_full_cart_contract_coverage() {
        let example = Example::new(HttpRequest::new("/carts/1"), hal_response(&cart_body()));

        let op = ExchangeNormalizer::default()
            .normalize(&id("cart-get"), HttpMethod::Get, &template("/carts/{id}"), &cart_get_contract(), example)
            .unwrap();

        let coverage = &op.examples[0].coverage;
        assert!(coverage.has_parameter(ParameterLocation::Path, "id"));
        assert_eq!(coverage.response_fields.len(), 6);
        assert_eq!(coverage.links, BTreeSet::from(["order".to_string()]));
        assert!(coverage.undocumented_response_fields.is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let mut body = cart_body();
        body.as_object_mut().unwrap().remove("products");
        let example = Example::new(HttpRequest::new("/carts/1"), hal_response(&body));

        let err = ExchangeNormalizer::default()
            .normalize(&id("cart-get"), HttpMethod::Get, &template("/carts/{id}"), &cart_get_contract(), example)
            .unwrap_err();

        match err {
            NormalizationError::MissingField(e) => {
                assert_eq!(e.path, "products");
                assert_eq!(e.part, "response");
                assert_eq!(e.operation_id, "cart-get");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_link_and_ignored_link() {
        let mut body = cart_body();
        body["_links"].as_object_mut().unwrap().remove("order");
        body["_links"].as_object_mut().unwrap().remove("self");
        let example = Example::new(HttpRequest::new("/carts/1"), hal_response(&body));

        let err = ExchangeNormalizer::default()
            .normalize(&id("cart-get"), HttpMethod::Get, &template("/carts/{id}"), &cart_get_contract(), example)
            .unwrap_err();

        assert!(matches!(err, NormalizationError::MissingLink(ref e) if e.rel == "order"));
    }

    #[test]
    fn test_links_skipped_without_hypermedia() {
        let mut body = cart_body();
        body["_links"] = json!({});
        let example = Example::new(
            HttpRequest::new("/carts/1"),
            HttpResponse::new(200).with_body(body.to_string(), "application/vnd.cart+json"),
        );

        let op = ExchangeNormalizer::default()
            .normalize(&id("cart-get"), HttpMethod::Get, &template("/carts/{id}"), &cart_get_contract(), example)
            .unwrap();
        assert!(op.examples[0].coverage.links.is_empty());
    }

    #[test]
    fn test_plain_json_links_use_atom_style() {
        let body = json!({
            "total": 10.5,
            "links": [{"rel": "order", "href": "http://localhost/carts/1/order"}]
        });
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("Get a cart by id")
                .with_response_fields([FieldDescriptor::field("total").with_description("Total amount of the cart.")])
                .with_links([LinkDescriptor::rel("order").with_description("Link to order the cart.")])
                .build()
                .unwrap(),
        );
        let normalizer = ExchangeNormalizer::new(NormalizerConfig::new());

        let op = normalizer
            .normalize(
                &id("cart-get"),
                HttpMethod::Get,
                &template("/carts/{id}"),
                &contract,
                Example::new(HttpRequest::new("/carts/1"), HttpResponse::new(200).with_json(&body)),
            )
            .unwrap();
        assert!(op.examples[0].coverage.links.contains("order"));

        let err = normalizer
            .normalize(
                &id("cart-get"),
                HttpMethod::Get,
                &template("/carts/{id}"),
                &contract,
                Example::new(HttpRequest::new("/carts/1"), HttpResponse::new(200).with_json(&json!({"total": 0}))),
            )
            .unwrap_err();
        assert!(matches!(err, NormalizationError::MissingLink(ref e) if e.rel == "order"));
    }

    #[test]
    fn test_link_extractor_is_pluggable() {
        let mut extractor = MockLinkExtractor::new();
        extractor
            .expect_extract_links()
            .times(1)
            .returning(|_, _| Some(vec![Link::new("order", "/carts/1/order")]));

        let example = Example::new(
            HttpRequest::new("/carts/1"),
            HttpResponse::new(200).with_json(&cart_body()),
        );
        let op = ExchangeNormalizer::default()
            .with_link_extractor(Arc::new(extractor))
            .normalize(&id("cart-get"), HttpMethod::Get, &template("/carts/{id}"), &cart_get_contract(), example)
            .unwrap();
        assert!(op.examples[0].coverage.links.contains("order"));
    }

    #[test]
    fn test_no_link_extractor_skips_even_hal() {
        let mut body = cart_body();
        body["_links"] = json!({});
        let example = Example::new(HttpRequest::new("/carts/1"), hal_response(&body));
        let result = ExchangeNormalizer::default()
            .with_link_extractor(Arc::new(NoLinkExtractor))
            .normalize(&id("cart-get"), HttpMethod::Get, &template("/carts/{id}"), &cart_get_contract(), example);
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_header_parameter() {
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("Add invoice to a cart")
                .with_request_headers([ParameterDescriptor::header("Content-Type")
                    .with_description("The content type of the file.")])
                .build()
                .unwrap(),
        );

        let normalizer = ExchangeNormalizer::default();
        let missing = normalizer
            .normalize(
                &id("cart-add-invoice"),
                HttpMethod::Post,
                &template("/carts/{id}/invoice"),
                &contract,
                Example::new(HttpRequest::new("/carts/someId/invoice"), HttpResponse::new(200)),
            )
            .unwrap_err();
        assert!(matches!(missing, NormalizationError::MissingParameter(ref e) if e.name == "Content-Type"));

        let ok = normalizer
            .normalize(
                &id("cart-add-invoice"),
                HttpMethod::Post,
                &template("/carts/{id}/invoice"),
                &contract,
                Example::new(
                    HttpRequest::new("/carts/someId/invoice")
                        .with_body(b"test".to_vec(), "multipart/form-data; boundary=x"),
                    HttpResponse::new(200),
                ),
            )
            .unwrap();
        assert!(ok.examples[0].coverage.has_parameter(ParameterLocation::Header, "Content-Type"));
    }

    #[test]
    fn test_optional_query_parameter_only_covered_when_present() {
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("List carts")
                .with_query_parameters([
                    ParameterDescriptor::query("page").with_description("Page").optional(),
                    ParameterDescriptor::query("size").with_description("Size"),
                ])
                .build()
                .unwrap(),
        );
        let normalizer = ExchangeNormalizer::default();

        let op = normalizer
            .normalize(
                &id("carts-list"),
                HttpMethod::Get,
                &template("/carts"),
                &contract,
                Example::new(HttpRequest::new("/carts?size=5"), HttpResponse::new(200)),
            )
            .unwrap();
        assert_eq!(
            op.examples[0].coverage.parameters,
            BTreeSet::from(["query:size".to_string()])
        );

        let err = normalizer
            .normalize(
                &id("carts-list"),
                HttpMethod::Get,
                &template("/carts"),
                &contract,
                Example::new(HttpRequest::new("/carts?page=1"), HttpResponse::new(200)),
            )
            .unwrap_err();
        assert!(matches!(err, NormalizationError::MissingParameter(ref e) if e.name == "size"));
    }

    #[test]
    fn test_encoded_query_parameter_names_are_found() {
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("List carts")
                .with_query_parameters([
                    ParameterDescriptor::query("page[size]").with_description("Page size"),
                    ParameterDescriptor::query("q").with_description("Search text"),
                ])
                .build()
                .unwrap(),
        );

        let op = ExchangeNormalizer::default()
            .normalize(
                &id("carts-list"),
                HttpMethod::Get,
                &template("/carts"),
                &contract,
                Example::new(
                    HttpRequest::new("/carts?page%5Bsize%5D=10&q=a#results"),
                    HttpResponse::new(200),
                ),
            )
            .unwrap();

        let coverage = &op.examples[0].coverage;
        assert!(coverage.has_parameter(ParameterLocation::Query, "page[size]"));
        assert!(coverage.has_parameter(ParameterLocation::Query, "q"));
        assert_eq!(op.examples[0].example.request.query_parameters()["q"], vec!["a"]);
    }

    #[test]
    fn test_response_fields_skipped_without_body() {
        let example = Example::new(HttpRequest::new("/carts/1"), HttpResponse::new(204));
        let op = ExchangeNormalizer::default()
            .with_link_extractor(Arc::new(NoLinkExtractor))
            .normalize(&id("cart-get"), HttpMethod::Get, &template("/carts/{id}"), &cart_get_contract(), example)
            .unwrap();
        assert!(op.examples[0].coverage.response_fields.is_empty());
    }

    #[test]
    fn test_request_fields_need_json() {
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("Add products to a cart")
                .with_request_fields([FieldDescriptor::field("product").with_description("Product uri")])
                .build()
                .unwrap(),
        );
        let example = Example::new(
            HttpRequest::new("/carts/1/products")
                .with_body("http://localhost/products/1", "text/uri-list"),
            HttpResponse::new(200),
        );
        let err = ExchangeNormalizer::default()
            .normalize(&id("cart-add-product"), HttpMethod::Post, &template("/carts/{id}/products"), &contract, example)
            .unwrap_err();
        assert!(matches!(err, NormalizationError::UnreadableBody(ref e) if e.part == "request"));
    }

    #[test]
    fn test_request_field_missing_from_empty_body() {
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("Create a product")
                .with_request_fields([FieldDescriptor::field("name").with_description("Name")])
                .build()
                .unwrap(),
        );
        let example = Example::new(HttpRequest::new("/products"), HttpResponse::new(201));
        let err = ExchangeNormalizer::default()
            .normalize(&id("products-create"), HttpMethod::Post, &template("/products"), &contract, example)
            .unwrap_err();
        assert!(matches!(err, NormalizationError::MissingField(ref e) if e.path == "name" && e.part == "request"));
    }

    #[test]
    fn test_field_type_validation_opt_in() {
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("Get a product")
                .with_response_fields([FieldDescriptor::field("price")
                    .with_description("Price")
                    .with_type(FieldType::Number)])
                .build()
                .unwrap(),
        );
        let example = || {
            Example::new(
                HttpRequest::new("/products/1"),
                HttpResponse::new(200).with_json(&json!({"price": "10.50"})),
            )
        };

        assert!(ExchangeNormalizer::default()
            .normalize(&id("product-get"), HttpMethod::Get, &template("/products/{id}"), &contract, example())
            .is_ok());

        let err = ExchangeNormalizer::new(NormalizerConfig::new().with_field_type_validation())
            .normalize(&id("product-get"), HttpMethod::Get, &template("/products/{id}"), &contract, example())
            .unwrap_err();
        assert!(matches!(err, NormalizationError::FieldTypeMismatch(ref e) if e.actual == "string"));
    }

    #[test]
    fn test_undocumented_fields_reported_and_strict() {
        let contract = Arc::new(
            ContractConfig::new()
                .with_description("Get a product")
                .with_response_fields([FieldDescriptor::field("name").with_description("Name")])
                .build()
                .unwrap(),
        );
        let example = || {
            Example::new(
                HttpRequest::new("/products/1"),
                HttpResponse::new(200).with_json(&json!({"name": "Fancy pants", "price": 10.5})),
            )
        };

        let op = ExchangeNormalizer::default()
            .normalize(&id("product-get"), HttpMethod::Get, &template("/products/{id}"), &contract, example())
            .unwrap();
        assert_eq!(op.examples[0].coverage.undocumented_response_fields, vec!["price"]);

        let err = ExchangeNormalizer::new(NormalizerConfig::new().strict())
            .normalize(&id("product-get"), HttpMethod::Get, &template("/products/{id}"), &contract, example())
            .unwrap_err();
        assert!(matches!(err, NormalizationError::UndocumentedFields(ref e) if e.paths == vec!["price"]));
    }

    #[test]
    fn test_deterministic() {
        let build = || {
            ExchangeNormalizer::default()
                .normalize(
                    &id("cart-get"),
                    HttpMethod::Get,
                    &template("/carts/{id}"),
                    &cart_get_contract(),
                    Example::new(HttpRequest::new("/carts/1"), hal_response(&cart_body())),
                )
                .unwrap()
        };
        assert_eq!(build().examples, build().examples);
    }
}
