//! Configuration for a recording run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::emitter::{ApiInfo, EmitterConfig, EmptyRegistryPolicy, OAuth2Scheme, SwaggerSettings};
use crate::errors::RecorderError;
use crate::normalizer::NormalizerConfig;

/// Settings for one documentation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Directory documents are written to.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
    /// File name prefix of written documents.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// API title.
    #[serde(default = "default_title")]
    pub title: String,
    /// API version.
    #[serde(default = "default_version")]
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server urls.
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,
    /// OAuth2 security scheme published in both renditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2: Option<OAuth2Scheme>,
    /// Also write an OpenAPI 2 document with these settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<SwaggerSettings>,
    /// Examples kept per operation.
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
    /// Behaviour when nothing was recorded.
    #[serde(default)]
    pub empty_registry: EmptyRegistryPolicy,
    /// Exchange validation options.
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("build/openapi")
}

fn default_prefix() -> String {
    "openapi3".to_string()
}

fn default_title() -> String {
    "API documentation".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_servers() -> Vec<String> {
    vec!["http://localhost".to_string()]
}

fn default_max_examples() -> usize {
    3
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            prefix: default_prefix(),
            title: default_title(),
            version: default_version(),
            description: None,
            servers: default_servers(),
            oauth2: None,
            swagger: None,
            max_examples: default_max_examples(),
            empty_registry: EmptyRegistryPolicy::default(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl RecorderConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing keys take their defaults.
    ///
    /// An OAuth2 scope descriptions file is read right away, relative to the
    /// configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RecorderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&json)?;
        if let Some(ref mut oauth2) = config.oauth2 {
            oauth2.load_scope_descriptions(path.parent())?;
        }
        Ok(config)
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = directory.into();
        self
    }

    /// Sets the file name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the API title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the API description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the server list.
    #[must_use]
    pub fn with_servers(mut self, servers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.servers = servers.into_iter().map(Into::into).collect();
        self
    }

    /// Publishes an OAuth2 security scheme.
    #[must_use]
    pub fn with_oauth2(mut self, scheme: OAuth2Scheme) -> Self {
        self.oauth2 = Some(scheme);
        self
    }

    /// Also writes an OpenAPI 2 document.
    #[must_use]
    pub fn with_swagger(mut self, settings: SwaggerSettings) -> Self {
        self.swagger = Some(settings);
        self
    }

    /// Sets how many examples are kept per operation.
    #[must_use]
    pub fn with_max_examples(mut self, max: usize) -> Self {
        self.max_examples = max;
        self
    }

    /// Sets the empty registry policy.
    #[must_use]
    pub fn with_empty_registry(mut self, policy: EmptyRegistryPolicy) -> Self {
        self.empty_registry = policy;
        self
    }

    /// Sets the normalizer options.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Emitter options derived from this configuration.
    #[must_use]
    pub fn emitter_config(&self) -> EmitterConfig {
        EmitterConfig {
            max_examples: self.max_examples,
            empty_registry: self.empty_registry,
        }
    }

    /// OpenAPI `info` and `servers` derived from this configuration.
    #[must_use]
    pub fn api_info(&self) -> ApiInfo {
        ApiInfo {
            title: self.title.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            servers: self.servers.clone(),
            oauth2: self.oauth2.clone(),
        }
    }
}
