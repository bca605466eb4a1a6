//! OpenAPI / Swagger document validation
//!
//! Checks a whole spec against the meta-schema for its declared version.
//! The meta-schemas are embedded; each one is compiled on first use and
//! kept in a caller-owned [`SpecValidatorCache`].

use include_dir::{include_dir, Dir};
use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use super::version::detect_version;
use crate::error::{LensError, Result};
use crate::validate::ValidationIssue;

static OPENAPI_SCHEMAS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/schemas/openapi");

/// Schema version used for Swagger 2.0 documents
pub const SWAGGER_SCHEMA_VERSION: &str = "2.0";

/// OpenAPI 3.x versions with an embedded meta-schema
pub const OPENAPI_SCHEMA_VERSIONS: [&str; 3] = ["3.0.3", "3.1.0", "3.2.0"];

/// Outcome of validating one spec document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecValidationReport {
    pub valid: bool,
    /// Declared `openapi` / `swagger` version, when one could be read
    pub version: Option<String>,
    /// Meta-schema the document was checked against
    pub schema_version: Option<String>,
    pub is_swagger: bool,
    pub errors: Vec<ValidationIssue>,
}

impl SpecValidationReport {
    fn rejected(version: Option<String>, is_swagger: bool, message: String) -> Self {
        Self {
            valid: false,
            version,
            schema_version: None,
            is_swagger,
            errors: vec![ValidationIssue { path: "root".to_string(), message }],
        }
    }
}

/// Lazily compiled spec meta-schemas, one cell per schema version
#[derive(Default)]
pub struct SpecValidatorCache {
    swagger_2_0: OnceLock<JSONSchema>,
    openapi_3_0: OnceLock<JSONSchema>,
    openapi_3_1: OnceLock<JSONSchema>,
    openapi_3_2: OnceLock<JSONSchema>,
}

impl SpecValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, schema_version: &str) -> Option<&OnceLock<JSONSchema>> {
        match schema_version {
            "2.0" => Some(&self.swagger_2_0),
            "3.0.3" => Some(&self.openapi_3_0),
            "3.1.0" => Some(&self.openapi_3_1),
            "3.2.0" => Some(&self.openapi_3_2),
            _ => None,
        }
    }

    /// Compile every embedded meta-schema now
    pub fn preload(&self) -> Result<()> {
        self.validator(SWAGGER_SCHEMA_VERSION)?;
        for version in OPENAPI_SCHEMA_VERSIONS {
            self.validator(version)?;
        }
        Ok(())
    }

    pub fn is_loaded(&self, schema_version: &str) -> bool {
        self.cell(schema_version).is_some_and(|cell| cell.get().is_some())
    }

    /// Look up (compiling on first use) the meta-schema for `schema_version`
    pub fn validator(&self, schema_version: &str) -> Result<&JSONSchema> {
        let cell = self
            .cell(schema_version)
            .ok_or_else(|| LensError::Validator(format!("no meta-schema for version {}", schema_version)))?;

        if let Some(compiled) = cell.get() {
            return Ok(compiled);
        }

        let compiled = compile(schema_version)?;
        Ok(cell.get_or_init(|| compiled))
    }

    /// Pick the meta-schema for the document's declared version and validate.
    ///
    /// `swagger: "2.0"` documents use the Swagger 2.0 schema; everything else
    /// goes through [`detect_version`] against the embedded 3.x versions.
    /// Version problems come back as an invalid report, never an error.
    pub fn validate_spec(&self, spec: &Value) -> SpecValidationReport {
        let swagger = spec.get("swagger").and_then(Value::as_str);

        let (version, schema_version, is_swagger) = match swagger {
            Some(declared) if declared == SWAGGER_SCHEMA_VERSION => {
                (declared.to_string(), SWAGGER_SCHEMA_VERSION.to_string(), true)
            }
            Some(declared) => {
                return SpecValidationReport::rejected(
                    Some(declared.to_string()),
                    true,
                    format!("Unsupported Swagger version: {}", declared),
                )
            }
            None => {
                let available: Vec<String> = OPENAPI_SCHEMA_VERSIONS.iter().map(|v| v.to_string()).collect();
                match detect_version(spec, &available) {
                    Ok(detected) => (detected.version, detected.schema_version, false),
                    Err(e) => {
                        let declared = spec.get("openapi").and_then(Value::as_str).map(String::from);
                        return SpecValidationReport::rejected(declared, false, e.to_string());
                    }
                }
            }
        };

        let validator = match self.validator(&schema_version) {
            Ok(v) => v,
            Err(e) => return SpecValidationReport::rejected(Some(version), is_swagger, e.to_string()),
        };

        let errors: Vec<ValidationIssue> = match validator.validate(spec) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    ValidationIssue {
                        path: if path.is_empty() { "root".to_string() } else { path },
                        message: err.to_string(),
                    }
                })
                .collect(),
        };
        debug!(version = %version, schema_version = %schema_version, errors = errors.len(), "spec validated");

        SpecValidationReport {
            valid: errors.is_empty(),
            version: Some(version),
            schema_version: Some(schema_version),
            is_swagger,
            errors,
        }
    }
}

/// Embedded file and draft for a schema version
fn schema_source(schema_version: &str) -> Option<(&'static str, Draft)> {
    match schema_version {
        "2.0" => Some(("swagger-2.0.schema.json", Draft::Draft4)),
        "3.0.3" => Some(("openapi-3.0.3.schema.json", Draft::Draft4)),
        "3.1.0" => Some(("openapi-3.1.0.schema.json", Draft::Draft7)),
        "3.2.0" => Some(("openapi-3.2.0.schema.json", Draft::Draft7)),
        _ => None,
    }
}

fn compile(schema_version: &str) -> Result<JSONSchema> {
    let (file_name, draft) = schema_source(schema_version)
        .ok_or_else(|| LensError::Validator(format!("no meta-schema for version {}", schema_version)))?;

    let contents = OPENAPI_SCHEMAS
        .get_file(file_name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| LensError::Validator(format!("embedded schema {} missing", file_name)))?;

    let schema: Value = serde_json::from_str(contents)?;
    JSONSchema::options()
        .with_draft(draft)
        .compile(&schema)
        .map_err(|e| LensError::Validator(format!("{}: {}", file_name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal(version: &str) -> Value {
        json!({
            "openapi": version,
            "info": { "title": "Minimal", "version": "1.0.0" },
            "paths": {
                "/health": { "get": { "responses": { "200": { "description": "ok" } } } }
            }
        })
    }

    #[test]
    fn test_every_embedded_schema_compiles() {
        let cache = SpecValidatorCache::new();
        assert!(!cache.is_loaded("3.1.0"));
        cache.preload().unwrap();

        assert!(cache.is_loaded(SWAGGER_SCHEMA_VERSION));
        for version in OPENAPI_SCHEMA_VERSIONS {
            assert!(cache.is_loaded(version), "{} not compiled", version);
        }
    }

    #[test]
    fn test_minimal_documents_are_valid() {
        let cache = SpecValidatorCache::new();
        for version in ["3.0.0", "3.0.3", "3.1.0", "3.2.0"] {
            let report = cache.validate_spec(&minimal(version));
            assert!(report.valid, "{}: {:?}", version, report.errors);
            assert!(!report.is_swagger);
        }

        let report = cache.validate_spec(&minimal("3.0.0"));
        assert_eq!(report.version.as_deref(), Some("3.0.0"));
        assert_eq!(report.schema_version.as_deref(), Some("3.0.3"));
        assert!(cache.is_loaded("3.0.3"));
    }

    #[test]
    fn test_missing_info_title() {
        let cache = SpecValidatorCache::new();
        let mut spec = minimal("3.1.0");
        spec["info"] = json!({ "version": "1.0.0" });

        let report = cache.validate_spec(&spec);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.path == "/info" && e.message.contains("title")));
    }

    #[test]
    fn test_swagger_uses_2_0_schema() {
        let cache = SpecValidatorCache::new();
        let report = cache.validate_spec(&json!({
            "swagger": "2.0",
            "info": { "title": "Legacy", "version": "1" }
        }));

        assert!(report.is_swagger);
        assert_eq!(report.schema_version.as_deref(), Some("2.0"));
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.path == "root" && e.message.contains("paths")));
    }

    #[test]
    fn test_version_problems_are_reported() {
        let cache = SpecValidatorCache::new();

        let report = cache.validate_spec(&json!({ "info": {} }));
        assert!(!report.valid);
        assert!(report.version.is_none());
        assert!(report.errors[0].message.contains("missing \"openapi\""));

        let report = cache.validate_spec(&minimal("4.0.0"));
        assert_eq!(report.version.as_deref(), Some("4.0.0"));
        assert!(report.schema_version.is_none());
        assert!(report.errors[0].message.starts_with("Unsupported OpenAPI version: 4.0.0"));

        let report = cache.validate_spec(&json!({ "swagger": "1.2" }));
        assert!(report.is_swagger);
        assert!(!report.valid);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = SpecValidatorCache::new().validate_spec(&minimal("3.1.0"));
        let rendered = serde_json::to_value(&report).unwrap();
        assert_eq!(rendered["schemaVersion"], "3.1.0");
        assert_eq!(rendered["isSwagger"], false);
        assert_eq!(rendered["errors"], json!([]));
    }
}
