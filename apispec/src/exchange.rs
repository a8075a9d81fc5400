//! Observed HTTP exchanges and the identifiers they are recorded under.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::contract::ParameterLocation;
use crate::errors::InvalidContractError;

static TEMPLATE_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_.\-]*)\}").expect("template variable regex is valid")
});

/// Caller-assigned identifier of a documented operation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationId(String);

impl OperationId {
    /// Creates an operation id. Blank ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidContractError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidContractError::new("operation id must not be empty"));
        }
        Ok(Self(id))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OperationId {
    type Error = InvalidContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OperationId> for String {
    fn from(id: OperationId) -> Self {
        id.0
    }
}

impl Borrow<str> for OperationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Uppercase method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = InvalidContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            other => Err(InvalidContractError::new(format!("unknown HTTP method '{other}'"))),
        }
    }
}

/// A path template such as `/carts/{id}/products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    template: String,
    variables: Vec<String>,
    matcher: Regex,
}

impl PathTemplate {
    /// Parses a template. It must start with `/` and have balanced braces.
    pub fn new(template: impl Into<String>) -> Result<Self, InvalidContractError> {
        let template = template.into();
        if !template.starts_with('/') {
            return Err(InvalidContractError::new(format!(
                "path template '{template}' must start with '/'"
            )));
        }
        if template.contains('?') {
            return Err(InvalidContractError::new(format!(
                "path template '{template}' must not carry a query string"
            )));
        }

        let mut variables = Vec::new();
        let mut pattern = String::from("^");
        let mut last = 0;
        for caps in TEMPLATE_VARIABLE.captures_iter(&template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let literal = &template[last..whole.start()];
            if literal.contains(['{', '}']) {
                return Err(unbalanced(&template));
            }
            pattern.push_str(&regex::escape(literal));
            pattern.push_str("([^/]+)");
            if variables.iter().any(|v| v == name.as_str()) {
                return Err(InvalidContractError::new(format!(
                    "path template '{template}' repeats variable '{}'",
                    name.as_str()
                )));
            }
            variables.push(name.as_str().to_string());
            last = whole.end();
        }
        let tail = &template[last..];
        if tail.contains(['{', '}']) {
            return Err(unbalanced(&template));
        }
        pattern.push_str(&regex::escape(tail));
        pattern.push('$');

        let matcher = Regex::new(&pattern).map_err(|e| {
            InvalidContractError::new(format!("path template '{template}': {e}"))
        })?;

        Ok(Self {
            template,
            variables,
            matcher,
        })
    }

    /// The template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Variable names in declaration order.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Matches a concrete path (query string and fragment ignored) and returns the variable values.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let path = strip_query(path);
        let caps = self.matcher.captures(path)?;
        Some(
            self.variables
                .iter()
                .enumerate()
                .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name.clone(), m.as_str().to_string())))
                .collect(),
        )
    }
}

fn unbalanced(template: &str) -> InvalidContractError {
    InvalidContractError::new(format!("path template '{template}' has unbalanced braces"))
}

fn strip_fragment(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(before, _)| before)
}

fn strip_query(uri: &str) -> &str {
    let uri = strip_fragment(uri);
    uri.split_once('?').map_or(uri, |(path, _)| path)
}

impl PartialEq for PathTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for PathTemplate {}

impl TryFrom<String> for PathTemplate {
    type Error = InvalidContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.template
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// One header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name as sent.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Ordered header list with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(Vec<Header>);

impl Headers {
    /// Creates an empty header list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Header {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Appends a header, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// First value of a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// True when the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.0.iter()
    }

    /// Number of header lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Headers as a name -> value map, repeated headers joined with `, `.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for header in &self.0 {
            map.entry(header.name.clone())
                .and_modify(|v| {
                    v.push_str(", ");
                    v.push_str(&header.value);
                })
                .or_insert_with(|| header.value.clone());
        }
        map
    }
}

/// The request half of an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Concrete request uri (path plus optional query string).
    pub uri: String,
    /// Request headers.
    #[serde(default)]
    pub headers: Headers,
    /// Path variable values supplied by the harness.
    #[serde(default)]
    pub path_variables: BTreeMap<String, String>,
    /// Raw body.
    #[serde(default, with = "base64_bytes")]
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a request for `uri` with no headers or body.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            headers: Headers::new(),
            path_variables: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Supplies a path variable value explicitly.
    #[must_use]
    pub fn with_path_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_variables.insert(name.into(), value.into());
        self
    }

    /// Sets the body and its `Content-Type`.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        self.body = body.into();
        self.headers.insert("Content-Type", content_type);
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_body(body.to_string(), "application/json")
    }

    /// Declared content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// The path part of the uri, without query string or fragment.
    #[must_use]
    pub fn path(&self) -> &str {
        strip_query(&self.uri)
    }

    /// Query parameters parsed from the uri, values in order of appearance.
    ///
    /// Names and values are form-decoded (`%5B` becomes `[`, `+` a space).
    #[must_use]
    pub fn query_parameters(&self) -> BTreeMap<String, Vec<String>> {
        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let Some((_, query)) = strip_fragment(&self.uri).split_once('?') else {
            return params;
        };
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            params.entry(name.into_owned()).or_default().push(value.into_owned());
        }
        params
    }

    /// Path variables: explicit values first, then values matched from the uri.
    #[must_use]
    pub fn resolve_path_variables(&self, template: &PathTemplate) -> BTreeMap<String, String> {
        let mut values = self.path_variables.clone();
        if let Some(matched) = template.matches(self.path()) {
            for (name, value) in matched {
                values.entry(name).or_insert(value);
            }
        }
        values
    }

    /// Value of a request parameter, if the request carries it.
    #[must_use]
    pub fn parameter_value(
        &self,
        template: &PathTemplate,
        location: ParameterLocation,
        name: &str,
    ) -> Option<String> {
        match location {
            ParameterLocation::Path => self.resolve_path_variables(template).remove(name),
            ParameterLocation::Query => self
                .query_parameters()
                .remove(name)
                .and_then(|values| values.into_iter().next()),
            ParameterLocation::Header => self.headers.get(name).map(String::from),
        }
    }
}

/// The response half of an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw body.
    #[serde(default, with = "base64_bytes")]
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with `status` and no headers or body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body and its `Content-Type`.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        self.body = body.into();
        self.headers.insert("Content-Type", content_type);
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_body(body.to_string(), "application/json")
    }

    /// Declared content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }
}

/// One concrete request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// What was sent.
    pub request: HttpRequest,
    /// What came back.
    pub response: HttpResponse,
}

impl Example {
    /// Pairs a request with its response.
    #[must_use]
    pub fn new(request: HttpRequest, response: HttpResponse) -> Self {
        Self { request, response }
    }
}

/// Strips parameters and lowercases a media type: `application/json; charset=utf-8` -> `application/json`.
#[must_use]
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// True for `application/json` and any `+json` media type.
#[must_use]
pub fn is_json_media_type(content_type: &str) -> bool {
    let media = media_type(content_type);
    media == "application/json" || media.ends_with("+json")
}

/// Parses a body as JSON. Empty or blank bodies yield `None`.
pub fn parse_json_body(body: &[u8]) -> Result<Option<serde_json::Value>, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some)
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
