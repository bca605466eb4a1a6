//! Error types for entity-lens

use thiserror::Error;

/// Result type for entity-lens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Errors raised at collaborator-facing entry points.
///
/// Per-document problems inside a batch never surface as `Err`; the batch
/// parser turns them into [`crate::batch::DocumentFailure`] records.
#[derive(Error, Debug)]
pub enum LensError {
    #[error("Malformed document {name}: {reason}")]
    MalformedDocument { name: String, reason: String },

    #[error("Could not extract EntitySchema from {0}")]
    NoEntitySchema(String),

    #[error("Invalid file type {0}. Allowed: .json, .yaml, .yml")]
    UnsupportedFileType(String),

    #[error("Invalid OpenAPI spec: missing \"openapi\" field")]
    MissingVersion,

    #[error("Invalid OpenAPI version format: {0}")]
    InvalidVersion(String),

    #[error("Unsupported OpenAPI version: {version}. Available versions: {available}")]
    UnsupportedVersion { version: String, available: String },

    #[error("Validator schema error: {0}")]
    Validator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
