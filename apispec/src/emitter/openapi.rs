//! OpenAPI 3 rendition of a [`SpecDocument`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::warn;
use utoipa::openapi::content::{Content, ContentBuilder};
use utoipa::openapi::header::HeaderBuilder;
use utoipa::openapi::info::InfoBuilder;
use utoipa::openapi::path::{
    HttpMethod as PathMethod, Operation, OperationBuilder, Parameter, ParameterBuilder, ParameterIn,
    PathItemBuilder, PathsBuilder,
};
use utoipa::openapi::request_body::{RequestBody, RequestBodyBuilder};
use utoipa::openapi::response::{Response, ResponseBuilder};
use utoipa::openapi::schema::{
    AdditionalProperties, ArrayBuilder, ArrayItems, ComponentsBuilder, ObjectBuilder, Schema, SchemaType, Type,
};
use utoipa::openapi::security::{
    AuthorizationCode, ClientCredentials, Flow, Implicit, OAuth2, Password, Scopes, SecurityScheme,
};
use utoipa::openapi::server::ServerBuilder;
use utoipa::openapi::tag::TagBuilder;
use utoipa::openapi::{OpenApi, OpenApiBuilder, RefOr, Required};

use super::document::{ExampleBody, FieldSection, OperationSection, ParameterSection, SpecDocument};
use super::schema::{SchemaShape, SchemaTree};
use crate::contract::{FieldType, ParameterLocation};
use crate::errors::RecorderError;
use crate::exchange::HttpMethod;

/// OpenAPI version written to the document.
pub const OPENAPI_VERSION: &str = "3.1.0";

/// Name of the OAuth2 entry under `components.securitySchemes`.
pub const OAUTH2_SCHEME_NAME: &str = "oauth2";

/// OAuth2 grant flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OAuth2Flow {
    /// Authorization code grant.
    AuthorizationCode,
    /// Client credentials grant.
    ClientCredentials,
    /// Resource owner password grant.
    Password,
    /// Implicit grant.
    Implicit,
}

/// OAuth2 security scheme published with the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Scheme {
    /// Token endpoint, used by the code, password and client credentials flows.
    #[serde(default)]
    pub token_url: String,
    /// Authorization endpoint, used by the code and implicit flows.
    #[serde(default)]
    pub authorization_url: String,
    /// Supported flows.
    #[serde(default)]
    pub flows: Vec<OAuth2Flow>,
    /// Scope name to description.
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
    /// JSON file of additional scope descriptions, read by
    /// [`OAuth2Scheme::load_scope_descriptions`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_descriptions_file: Option<PathBuf>,
}

impl OAuth2Scheme {
    /// Creates a scheme with no flows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Sets the authorization endpoint.
    #[must_use]
    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = url.into();
        self
    }

    /// Adds a flow.
    #[must_use]
    pub fn with_flow(mut self, flow: OAuth2Flow) -> Self {
        if !self.flows.contains(&flow) {
            self.flows.push(flow);
        }
        self
    }

    /// Describes a scope.
    #[must_use]
    pub fn with_scope(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.scopes.insert(name.into(), description.into());
        self
    }

    /// Reads scope descriptions from a JSON object file, keeping the path.
    pub fn with_scope_descriptions_file(mut self, path: impl Into<PathBuf>) -> Result<Self, RecorderError> {
        self.scope_descriptions_file = Some(path.into());
        self.load_scope_descriptions(None)?;
        Ok(self)
    }

    /// Merges the descriptions of `scope_descriptions_file` into `scopes`.
    /// Relative paths are resolved against `base`. File entries win.
    pub fn load_scope_descriptions(&mut self, base: Option<&Path>) -> Result<(), RecorderError> {
        let Some(ref file) = self.scope_descriptions_file else {
            return Ok(());
        };
        let path = match base {
            Some(base) if file.is_relative() => base.join(file),
            _ => file.clone(),
        };
        let json = std::fs::read_to_string(path)?;
        let descriptions: BTreeMap<String, String> = serde_json::from_str(&json)?;
        self.scopes.extend(descriptions);
        Ok(())
    }

    fn grant_flows(&self) -> impl Iterator<Item = Flow> + '_ {
        self.flows.iter().map(move |flow| match flow {
            OAuth2Flow::AuthorizationCode => Flow::AuthorizationCode(AuthorizationCode::new(
                &self.authorization_url,
                &self.token_url,
                self.scope_set(),
            )),
            OAuth2Flow::ClientCredentials => {
                Flow::ClientCredentials(ClientCredentials::new(&self.token_url, self.scope_set()))
            }
            OAuth2Flow::Password => Flow::Password(Password::new(&self.token_url, self.scope_set())),
            OAuth2Flow::Implicit => Flow::Implicit(Implicit::new(&self.authorization_url, self.scope_set())),
        })
    }

    fn scope_set(&self) -> Scopes {
        self.scopes
            .iter()
            .map(|(name, description)| (name.clone(), description.clone()))
            .collect()
    }
}

/// The `info`, `servers` and security parts of an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server urls.
    #[serde(default)]
    pub servers: Vec<String>,
    /// OAuth2 security scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2: Option<OAuth2Scheme>,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            title: "API documentation".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            servers: vec!["http://localhost".to_string()],
            oauth2: None,
        }
    }
}

/// Renders the document as OpenAPI 3.
///
/// Operations are grouped by path template. Schemas come from the field
/// sections; examples come from the first kept example for each status.
#[must_use]
pub fn to_openapi(document: &SpecDocument, info: &ApiInfo) -> OpenApi {
    let mut templates: BTreeMap<&str, PathItemBuilder> = BTreeMap::new();
    let mut seen = BTreeSet::new();
    let mut tags = BTreeSet::new();

    for (id, section) in document.iter() {
        tags.extend(section.tags.iter().cloned());
        if !seen.insert((section.path.as_str(), section.method)) {
            warn!(
                operation_id = %id,
                method = %section.method,
                path = %section.path,
                "Two operations share a method and path, keeping the last"
            );
        }
        let item = templates
            .remove(section.path.as_str())
            .unwrap_or_else(PathItemBuilder::new);
        templates.insert(
            section.path.as_str(),
            item.operation(path_method(section.method), operation(id.as_str(), section)),
        );
    }

    let paths = templates
        .into_iter()
        .fold(PathsBuilder::new(), |paths, (template, item)| paths.path(template, item.build()))
        .build();

    let servers = (!info.servers.is_empty()).then(|| {
        info.servers
            .iter()
            .map(|url| ServerBuilder::new().url(url.as_str()).build())
            .collect::<Vec<_>>()
    });
    let tags = (!tags.is_empty()).then(|| {
        tags.into_iter()
            .map(|name| TagBuilder::new().name(name).build())
            .collect::<Vec<_>>()
    });
    let components = info.oauth2.as_ref().map(|scheme| {
        ComponentsBuilder::new()
            .security_scheme(OAUTH2_SCHEME_NAME, SecurityScheme::OAuth2(OAuth2::new(scheme.grant_flows())))
            .build()
    });

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(info.title.as_str())
                .version(info.version.as_str())
                .description(info.description.as_deref())
                .build(),
        )
        .servers(servers)
        .paths(paths)
        .components(components)
        .tags(tags)
        .build()
}

fn path_method(method: HttpMethod) -> PathMethod {
    match method {
        HttpMethod::Get => PathMethod::Get,
        HttpMethod::Head => PathMethod::Head,
        HttpMethod::Post => PathMethod::Post,
        HttpMethod::Put => PathMethod::Put,
        HttpMethod::Patch => PathMethod::Patch,
        HttpMethod::Delete => PathMethod::Delete,
        HttpMethod::Options => PathMethod::Options,
        HttpMethod::Trace => PathMethod::Trace,
    }
}

fn operation(id: &str, section: &OperationSection) -> Operation {
    let mut builder = OperationBuilder::new()
        .operation_id(Some(id))
        .summary(Some(section.summary.as_deref().unwrap_or(&section.description)))
        .description(Some(section.description.as_str()))
        .tags((!section.tags.is_empty()).then(|| section.tags.clone()))
        .request_body(request_body(section));

    for param in &section.parameters {
        builder = builder.parameter(parameter(param));
    }
    for status in &section.status_codes {
        builder = builder.response(status.to_string(), response(section, *status));
    }
    builder.build()
}

fn parameter(param: &ParameterSection) -> Parameter {
    ParameterBuilder::new()
        .name(param.name.as_str())
        .parameter_in(match param.location {
            ParameterLocation::Path => ParameterIn::Path,
            ParameterLocation::Query => ParameterIn::Query,
            ParameterLocation::Header => ParameterIn::Header,
        })
        .description(Some(param.description.as_str()))
        .required(if param.location == ParameterLocation::Path || !param.optional {
            Required::True
        } else {
            Required::False
        })
        .schema(Some(RefOr::T(string_schema())))
        .example(param.example.clone().map(Value::String))
        .build()
}

fn request_body(section: &OperationSection) -> Option<RequestBody> {
    let example = section
        .examples
        .iter()
        .find_map(|pair| example_value(&pair.request.body));
    if section.request_fields.is_empty() && example.is_none() {
        return None;
    }
    let content_type = section.request_content_type.as_deref().unwrap_or("application/json");
    Some(
        RequestBodyBuilder::new()
            .content(content_type, content(&section.request_fields, example))
            .build(),
    )
}

fn response(section: &OperationSection, status: u16) -> Response {
    let mut builder = ResponseBuilder::new().description(reason_phrase(status));

    for header in &section.response_headers {
        builder = builder.header(
            header.name.as_str(),
            HeaderBuilder::new()
                .schema(RefOr::T(string_schema()))
                .description(Some(header.description.as_str()))
                .build(),
        );
    }

    let example = status_example(section, status);
    if let Some(ref content_type) = section.response_content_type {
        if example.is_some() || !section.response_fields.is_empty() {
            builder = builder.content(content_type.as_str(), content(&section.response_fields, example));
        }
    }
    builder.build()
}

fn content(fields: &[FieldSection], example: Option<Value>) -> Content {
    let schema = (!fields.is_empty()).then(|| RefOr::T(schema(&SchemaTree::from_fields(fields))));
    ContentBuilder::new().schema(schema).example(example).build()
}

fn string_schema() -> Schema {
    Schema::Object(ObjectBuilder::new().schema_type(SchemaType::Type(Type::String)).build())
}

fn schema(tree: &SchemaTree) -> Schema {
    let description = tree.description();
    match tree.shape() {
        SchemaShape::Object {
            properties,
            required,
            additional,
        } => {
            let mut object = ObjectBuilder::new()
                .schema_type(SchemaType::Type(Type::Object))
                .description(description);
            for (name, child) in properties {
                object = object.property(name.as_str(), RefOr::T(schema(child)));
            }
            for name in required {
                object = object.required(name.as_str());
            }
            if let Some(additional) = additional {
                object = object.additional_properties(Some(AdditionalProperties::RefOr(RefOr::T(schema(additional)))));
            }
            Schema::Object(object.build())
        }
        SchemaShape::Array(items) => Schema::Array(
            ArrayBuilder::new()
                .items(ArrayItems::RefOrSchema(Box::new(RefOr::T(schema(items)))))
                .description(description)
                .build(),
        ),
        SchemaShape::Leaf(field_type) => Schema::Object(
            ObjectBuilder::new()
                .schema_type(leaf_type(field_type))
                .description(description)
                .build(),
        ),
    }
}

fn leaf_type(field_type: Option<FieldType>) -> SchemaType {
    match field_type {
        Some(FieldType::Object) => SchemaType::Type(Type::Object),
        Some(FieldType::Array) => SchemaType::Type(Type::Array),
        Some(FieldType::String) => SchemaType::Type(Type::String),
        Some(FieldType::Number) => SchemaType::Type(Type::Number),
        Some(FieldType::Boolean) => SchemaType::Type(Type::Boolean),
        Some(FieldType::Null) => SchemaType::Type(Type::Null),
        Some(FieldType::Varies) | None => SchemaType::AnyValue,
    }
}

/// First example body recorded with `status`.
pub(super) fn status_example(section: &OperationSection, status: u16) -> Option<Value> {
    section
        .examples
        .iter()
        .filter(|pair| pair.response.status == status)
        .find_map(|pair| example_value(&pair.response.body))
}

/// Example body as a JSON value; text and base64 bodies become strings.
pub(super) fn example_value(body: &ExampleBody) -> Option<Value> {
    match body {
        ExampleBody::Empty => None,
        ExampleBody::Json(value) => Some(value.clone()),
        ExampleBody::Text(text) | ExampleBody::Binary(text) => Some(Value::String(text.clone())),
    }
}

pub(super) fn reason_phrase(status: u16) -> String {
    let phrase = match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => return format!("Status {status}"),
    };
    phrase.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(path: &str, field_type: Option<FieldType>, optional: bool) -> FieldSection {
        FieldSection {
            path: path.to_string(),
            description: format!("The {path}"),
            field_type,
            optional,
            subsection: false,
            observed: true,
        }
    }

    fn schema_json(fields: &[FieldSection]) -> Value {
        serde_json::to_value(schema(&SchemaTree::from_fields(fields))).unwrap()
    }

    #[test]
    fn test_schema_from_field_paths() {
        let schema = schema_json(&[
            field("total", Some(FieldType::Number), false),
            field("products", Some(FieldType::Array), false),
            field("products[].quantity", Some(FieldType::Number), false),
            field("products[].product", Some(FieldType::Object), true),
        ]);

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["products", "total"]));
        assert_eq!(schema["properties"]["total"]["type"], "number");
        let products = &schema["properties"]["products"];
        assert_eq!(products["type"], "array");
        assert_eq!(products["description"], "The products");
        assert_eq!(products["items"]["required"], json!(["quantity"]));
        assert_eq!(products["items"]["properties"]["product"]["type"], "object");
    }

    #[test]
    fn test_null_and_varies_types() {
        let schema = schema_json(&[
            field("deleted_at", Some(FieldType::Null), true),
            field("meta", Some(FieldType::Varies), true),
        ]);
        assert_eq!(schema["properties"]["deleted_at"]["type"], "null");
        assert!(schema["properties"]["meta"].get("type").is_none());
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(201), "Created");
        assert_eq!(reason_phrase(299), "Status 299");
    }

    #[test]
    fn test_empty_document() {
        let openapi = serde_json::to_value(to_openapi(&SpecDocument::new(), &ApiInfo::default())).unwrap();
        assert_eq!(openapi["openapi"], OPENAPI_VERSION);
        assert_eq!(openapi["info"]["title"], "API documentation");
        assert_eq!(openapi["servers"][0]["url"], "http://localhost");
        assert_eq!(openapi["paths"], json!({}));
        assert!(openapi.get("tags").is_none());
        assert!(openapi.get("components").is_none());
    }

    #[test]
    fn test_oauth2_security_scheme() {
        let info = ApiInfo {
            oauth2: Some(
                OAuth2Scheme::new()
                    .with_token_url("https://auth.example.com/token")
                    .with_authorization_url("https://auth.example.com/authorize")
                    .with_flow(OAuth2Flow::AuthorizationCode)
                    .with_flow(OAuth2Flow::ClientCredentials)
                    .with_scope("carts:read", "Read carts")
                    .with_scope("carts:write", "Modify carts"),
            ),
            ..ApiInfo::default()
        };
        let openapi = serde_json::to_value(to_openapi(&SpecDocument::new(), &info)).unwrap();

        let scheme = &openapi["components"]["securitySchemes"][OAUTH2_SCHEME_NAME];
        assert_eq!(scheme["type"], "oauth2");
        let code = &scheme["flows"]["authorizationCode"];
        assert_eq!(code["authorizationUrl"], "https://auth.example.com/authorize");
        assert_eq!(code["tokenUrl"], "https://auth.example.com/token");
        assert_eq!(code["scopes"]["carts:read"], "Read carts");
        assert_eq!(
            scheme["flows"]["clientCredentials"]["scopes"]["carts:write"],
            "Modify carts"
        );
        assert!(scheme["flows"].get("implicit").is_none());
    }

    #[test]
    fn test_scope_descriptions_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("scopes.json"), r#"{"carts:read": "Read any cart"}"#)?;

        let mut scheme = OAuth2Scheme {
            scope_descriptions_file: Some(PathBuf::from("scopes.json")),
            ..OAuth2Scheme::new().with_scope("carts:read", "Read carts").with_scope("orders:read", "Read orders")
        };
        scheme.load_scope_descriptions(Some(dir.path()))?;
        assert_eq!(scheme.scopes["carts:read"], "Read any cart");
        assert_eq!(scheme.scopes["orders:read"], "Read orders");

        assert!(OAuth2Scheme::new().with_scope_descriptions_file(dir.path().join("missing.json")).is_err());
        Ok(())
    }
}
