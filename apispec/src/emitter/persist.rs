//! Writing documents to disk.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::document::SpecDocument;
use super::openapi::{to_openapi, ApiInfo};
use super::swagger::{to_swagger, SwaggerSettings};
use crate::errors::RecorderError;

/// Paths of the files written by [`write_documents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocuments {
    /// The OpenAPI rendition, `<prefix>.json`.
    pub openapi: PathBuf,
    /// The interchange document, `<prefix>-operations.json`.
    pub operations: PathBuf,
    /// The OpenAPI 2 rendition, when one was requested.
    pub swagger: Option<PathBuf>,
}

/// Serializes `value` as pretty JSON to `path`, creating parent directories.
/// Returns the written text.
pub fn persist_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<String, RecorderError> {
    let json = serde_json::to_string_pretty(value)?;
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(json)
}

/// Writes the interchange document and its OpenAPI rendition under `directory`.
pub fn write_documents(
    document: &SpecDocument,
    info: &ApiInfo,
    directory: impl AsRef<Path>,
    prefix: &str,
) -> Result<WrittenDocuments, RecorderError> {
    let directory = directory.as_ref();
    let written = WrittenDocuments {
        openapi: directory.join(format!("{prefix}.json")),
        operations: directory.join(format!("{prefix}-operations.json")),
        swagger: None,
    };

    persist_json(&written.operations, document)?;
    persist_json(&written.openapi, &to_openapi(document, info))?;

    info!(
        operations = document.len(),
        openapi = %written.openapi.display(),
        interchange = %written.operations.display(),
        "Wrote spec documents"
    );
    Ok(written)
}

/// Writes the OpenAPI 2 rendition to `<settings.prefix>.json` under `directory`.
pub fn write_swagger(
    document: &SpecDocument,
    info: &ApiInfo,
    settings: &SwaggerSettings,
    directory: impl AsRef<Path>,
) -> Result<PathBuf, RecorderError> {
    let path = directory.as_ref().join(format!("{}.json", settings.prefix));
    persist_json(&path, &to_swagger(document, info, settings))?;
    info!(
        operations = document.len(),
        swagger = %path.display(),
        "Wrote OpenAPI 2 document"
    );
    Ok(path)
}
