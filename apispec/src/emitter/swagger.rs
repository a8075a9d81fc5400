//! OpenAPI 2 (Swagger) rendition of a [`SpecDocument`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use super::document::{FieldSection, OperationSection, ParameterSection, SpecDocument};
use super::openapi::{example_value, reason_phrase, status_example, ApiInfo, OAuth2Flow, OAuth2Scheme};
use super::schema::{SchemaShape, SchemaTree};
use crate::contract::{FieldType, ParameterLocation};

/// Version written to the `swagger` key.
pub const SWAGGER_VERSION: &str = "2.0";

/// Where an OpenAPI 2 document says the API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwaggerSettings {
    /// Host, optionally with a port.
    #[serde(default = "default_host")]
    pub host: String,
    /// Path prefix of every operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Transfer protocols.
    #[serde(default = "default_schemes")]
    pub schemes: Vec<String>,
    /// File name prefix of the written document.
    #[serde(default = "default_swagger_prefix")]
    pub prefix: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_schemes() -> Vec<String> {
    vec!["http".to_string()]
}

fn default_swagger_prefix() -> String {
    "openapi".to_string()
}

impl Default for SwaggerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            base_path: None,
            schemes: default_schemes(),
            prefix: default_swagger_prefix(),
        }
    }
}

impl SwaggerSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the base path.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Replaces the schemes.
    #[must_use]
    pub fn with_schemes(mut self, schemes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.schemes = schemes.into_iter().map(Into::into).collect();
        self
    }
}

/// An OpenAPI 2 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerDocument {
    /// Always [`SWAGGER_VERSION`].
    pub swagger: String,
    /// Title, version and description.
    pub info: SwaggerInfo,
    /// Host.
    pub host: String,
    /// Path prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Transfer protocols.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    /// Grouping tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<SwaggerTag>,
    /// Path template to lowercase method to operation.
    pub paths: BTreeMap<String, BTreeMap<String, SwaggerOperation>>,
    /// One OAuth2 definition per flow.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_definitions: BTreeMap<String, SwaggerSecurityDefinition>,
}

/// `info` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwaggerInfo {
    /// Title.
    pub title: String,
    /// Version.
    pub version: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tag entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwaggerTag {
    /// Tag name.
    pub name: String,
}

/// One operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerOperation {
    /// Operation id.
    pub operation_id: String,
    /// Summary.
    pub summary: String,
    /// Description.
    pub description: String,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Request media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    /// Response media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    /// Parameters, the body last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SwaggerParameter>,
    /// Responses by status.
    pub responses: BTreeMap<String, SwaggerResponse>,
}

/// A path, query, header or body parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerParameter {
    /// Name.
    pub name: String,
    /// `path`, `query`, `header` or `body`.
    #[serde(rename = "in")]
    pub location: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Required.
    pub required: bool,
    /// Primitive type of non-body parameters.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    /// First value seen.
    #[serde(rename = "x-example", default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SwaggerSchema>,
}

/// One response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerResponse {
    /// Description.
    pub description: String,
    /// Headers by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, SwaggerHeader>,
    /// Body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SwaggerSchema>,
    /// Example body by media type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, Value>,
}

/// A response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwaggerHeader {
    /// Primitive type.
    #[serde(rename = "type")]
    pub header_type: String,
    /// Description.
    pub description: String,
}

/// A JSON schema in the OpenAPI 2 subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerSchema {
    /// Type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object members.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SwaggerSchema>,
    /// Required members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Array items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SwaggerSchema>>,
    /// Schema of unnamed members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SwaggerSchema>>,
    /// Only `null` was seen.
    #[serde(rename = "x-nullable", default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

/// An OAuth2 security definition for one flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerSecurityDefinition {
    /// Always `oauth2`.
    #[serde(rename = "type")]
    pub definition_type: String,
    /// `accessCode`, `application`, `password` or `implicit`.
    pub flow: String,
    /// Authorization endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    /// Token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    /// Scope descriptions.
    pub scopes: BTreeMap<String, String>,
}

/// Renders the document as OpenAPI 2.
///
/// Same grouping and examples as [`super::to_openapi`]; paths are relative to
/// `settings.base_path`.
#[must_use]
pub fn to_swagger(document: &SpecDocument, info: &ApiInfo, settings: &SwaggerSettings) -> SwaggerDocument {
    let mut paths: BTreeMap<String, BTreeMap<String, SwaggerOperation>> = BTreeMap::new();
    let mut tags = BTreeSet::new();

    for (id, section) in document.iter() {
        tags.extend(section.tags.iter().cloned());
        let method = section.method.as_str().to_ascii_lowercase();
        let item = paths.entry(section.path.clone()).or_default();
        if item.insert(method, operation(id.as_str(), section)).is_some() {
            warn!(
                operation_id = %id,
                method = %section.method,
                path = %section.path,
                "Two operations share a method and path, keeping the last"
            );
        }
    }

    SwaggerDocument {
        swagger: SWAGGER_VERSION.to_string(),
        info: SwaggerInfo {
            title: info.title.clone(),
            version: info.version.clone(),
            description: info.description.clone(),
        },
        host: settings.host.clone(),
        base_path: settings.base_path.clone(),
        schemes: settings.schemes.clone(),
        tags: tags.into_iter().map(|name| SwaggerTag { name }).collect(),
        paths,
        security_definitions: info.oauth2.as_ref().map(security_definitions).unwrap_or_default(),
    }
}

fn security_definitions(scheme: &OAuth2Scheme) -> BTreeMap<String, SwaggerSecurityDefinition> {
    scheme
        .flows
        .iter()
        .map(|flow| {
            let (name, uses_authorization, uses_token) = match flow {
                OAuth2Flow::AuthorizationCode => ("accessCode", true, true),
                OAuth2Flow::ClientCredentials => ("application", false, true),
                OAuth2Flow::Password => ("password", false, true),
                OAuth2Flow::Implicit => ("implicit", true, false),
            };
            let definition = SwaggerSecurityDefinition {
                definition_type: "oauth2".to_string(),
                flow: name.to_string(),
                authorization_url: uses_authorization.then(|| scheme.authorization_url.clone()),
                token_url: uses_token.then(|| scheme.token_url.clone()),
                scopes: scheme.scopes.clone(),
            };
            (format!("oauth2_{name}"), definition)
        })
        .collect()
}

fn operation(id: &str, section: &OperationSection) -> SwaggerOperation {
    let mut parameters: Vec<SwaggerParameter> = section.parameters.iter().map(parameter).collect();
    let body_example = section
        .examples
        .iter()
        .find_map(|pair| example_value(&pair.request.body));
    let has_body = !section.request_fields.is_empty() || body_example.is_some();
    if has_body {
        parameters.push(SwaggerParameter {
            name: "body".to_string(),
            location: "body".to_string(),
            description: None,
            required: true,
            param_type: None,
            example: None,
            schema: Some(body_schema(&section.request_fields)),
        });
    }

    SwaggerOperation {
        operation_id: id.to_string(),
        summary: section.summary.clone().unwrap_or_else(|| section.description.clone()),
        description: section.description.clone(),
        tags: section.tags.clone(),
        consumes: if has_body {
            vec![section
                .request_content_type
                .clone()
                .unwrap_or_else(|| "application/json".to_string())]
        } else {
            Vec::new()
        },
        produces: section.response_content_type.iter().cloned().collect(),
        parameters,
        responses: section
            .status_codes
            .iter()
            .map(|status| (status.to_string(), response(section, *status)))
            .collect(),
    }
}

fn parameter(param: &ParameterSection) -> SwaggerParameter {
    SwaggerParameter {
        name: param.name.clone(),
        location: param.location.as_str().to_string(),
        description: Some(param.description.clone()),
        required: param.location == ParameterLocation::Path || !param.optional,
        param_type: Some("string".to_string()),
        example: param.example.clone(),
        schema: None,
    }
}

fn response(section: &OperationSection, status: u16) -> SwaggerResponse {
    let example = status_example(section, status);
    let has_content = section.response_content_type.is_some()
        && (example.is_some() || !section.response_fields.is_empty());

    SwaggerResponse {
        description: reason_phrase(status),
        headers: section
            .response_headers
            .iter()
            .map(|h| {
                let header = SwaggerHeader {
                    header_type: "string".to_string(),
                    description: h.description.clone(),
                };
                (h.name.clone(), header)
            })
            .collect(),
        schema: (has_content && !section.response_fields.is_empty())
            .then(|| body_schema(&section.response_fields)),
        examples: match (&section.response_content_type, example) {
            (Some(content_type), Some(example)) if has_content => {
                BTreeMap::from([(content_type.clone(), example)])
            }
            _ => BTreeMap::new(),
        },
    }
}

fn body_schema(fields: &[FieldSection]) -> SwaggerSchema {
    if fields.is_empty() {
        return SwaggerSchema::default();
    }
    schema(&SchemaTree::from_fields(fields))
}

fn schema(tree: &SchemaTree) -> SwaggerSchema {
    let mut out = SwaggerSchema {
        description: tree.description().map(String::from),
        ..SwaggerSchema::default()
    };
    match tree.shape() {
        SchemaShape::Object {
            properties,
            required,
            additional,
        } => {
            out.schema_type = Some("object".to_string());
            out.properties = properties
                .iter()
                .map(|(name, child)| (name.clone(), schema(child)))
                .collect();
            out.required = required.iter().cloned().collect();
            out.additional_properties = additional.map(|a| Box::new(schema(a)));
        }
        SchemaShape::Array(items) => {
            out.schema_type = Some("array".to_string());
            out.items = Some(Box::new(schema(items)));
        }
        SchemaShape::Leaf(Some(FieldType::Null)) => out.nullable = true,
        SchemaShape::Leaf(Some(FieldType::Varies) | None) => {}
        SchemaShape::Leaf(Some(other)) => out.schema_type = Some(other.as_str().to_string()),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::document::{ExampleBody, ExamplePair, ExampleRequest, ExampleResponse};
    use crate::exchange::{HttpMethod, OperationId};
    use serde_json::json;

    fn create_cart_section() -> OperationSection {
        OperationSection {
            method: HttpMethod::Post,
            path: "/carts/{id}/products".to_string(),
            description: "Add a product to a cart".to_string(),
            summary: None,
            tags: vec!["carts".to_string()],
            parameters: vec![ParameterSection {
                name: "id".to_string(),
                location: ParameterLocation::Path,
                description: "the cart id".to_string(),
                optional: false,
                observed: true,
                example: Some("1".to_string()),
            }],
            response_headers: Vec::new(),
            request_fields: Vec::new(),
            response_fields: vec![FieldSection {
                path: "total".to_string(),
                description: "Total amount".to_string(),
                field_type: Some(FieldType::Number),
                optional: false,
                subsection: false,
                observed: true,
            }],
            links: Vec::new(),
            request_content_type: Some("text/uri-list".to_string()),
            response_content_type: Some("application/hal+json".to_string()),
            status_codes: vec![200],
            example_count: 1,
            examples: vec![ExamplePair {
                request: ExampleRequest {
                    uri: "/carts/1/products".to_string(),
                    headers: BTreeMap::new(),
                    content_type: Some("text/uri-list".to_string()),
                    body: ExampleBody::Text("http://localhost/products/3".to_string()),
                },
                response: ExampleResponse {
                    status: 200,
                    headers: BTreeMap::new(),
                    content_type: Some("application/hal+json".to_string()),
                    body: ExampleBody::Json(json!({"total": 9.99})),
                },
            }],
        }
    }

    #[test]
    fn test_swagger_document() {
        let mut doc = SpecDocument::new();
        doc.insert(OperationId::new("cart-add-product").unwrap(), create_cart_section());
        let settings = SwaggerSettings::new()
            .with_host("api.example.com")
            .with_base_path("/v1")
            .with_schemes(["https"]);

        let swagger = serde_json::to_value(to_swagger(&doc, &ApiInfo::default(), &settings)).unwrap();

        assert_eq!(swagger["swagger"], "2.0");
        assert_eq!(swagger["host"], "api.example.com");
        assert_eq!(swagger["basePath"], "/v1");
        assert_eq!(swagger["schemes"], json!(["https"]));
        assert_eq!(swagger["tags"][0]["name"], "carts");

        let op = &swagger["paths"]["/carts/{id}/products"]["post"];
        assert_eq!(op["operationId"], "cart-add-product");
        assert_eq!(op["consumes"], json!(["text/uri-list"]));
        assert_eq!(op["produces"], json!(["application/hal+json"]));
        assert_eq!(op["parameters"][0]["in"], "path");
        assert_eq!(op["parameters"][0]["type"], "string");
        assert_eq!(op["parameters"][0]["x-example"], "1");
        assert_eq!(op["parameters"][1]["in"], "body");

        let ok = &op["responses"]["200"];
        assert_eq!(ok["description"], "OK");
        assert_eq!(ok["schema"]["properties"]["total"]["type"], "number");
        assert_eq!(ok["examples"]["application/hal+json"], json!({"total": 9.99}));
        assert!(swagger.get("securityDefinitions").is_none());
    }

    #[test]
    fn test_defaults_and_security_definitions() {
        let info = ApiInfo {
            oauth2: Some(
                OAuth2Scheme::new()
                    .with_token_url("https://auth.example.com/token")
                    .with_authorization_url("https://auth.example.com/authorize")
                    .with_flow(OAuth2Flow::AuthorizationCode)
                    .with_flow(OAuth2Flow::ClientCredentials)
                    .with_scope("carts:read", "Read carts"),
            ),
            ..ApiInfo::default()
        };
        let swagger = to_swagger(&SpecDocument::new(), &info, &SwaggerSettings::default());

        assert_eq!(swagger.host, "localhost");
        assert_eq!(swagger.schemes, vec!["http"]);
        assert!(swagger.base_path.is_none());

        let code = &swagger.security_definitions["oauth2_accessCode"];
        assert_eq!(code.authorization_url.as_deref(), Some("https://auth.example.com/authorize"));
        assert_eq!(code.scopes["carts:read"], "Read carts");
        let application = &swagger.security_definitions["oauth2_application"];
        assert!(application.authorization_url.is_none());
        assert_eq!(application.token_url.as_deref(), Some("https://auth.example.com/token"));
    }

    #[test]
    fn test_null_leaf_is_marked_nullable() {
        let tree = SchemaTree::from_fields(&[FieldSection {
            path: "deleted_at".to_string(),
            description: "Deletion time".to_string(),
            field_type: Some(FieldType::Null),
            optional: true,
            subsection: false,
            observed: true,
        }]);
        let json = serde_json::to_value(schema(&tree)).unwrap();
        assert_eq!(json["properties"]["deleted_at"]["x-nullable"], true);
        assert!(json.get("required").is_none());
    }
}
