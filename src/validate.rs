//! Descriptor Validation
//!
//! Checks raw descriptors against embedded JSON Schemas for the TypeORM
//! `EntitySchema` and Sequelize model shapes. Validation is advisory: a
//! failing report never prevents a descriptor from being parsed.
//!
//! Compiled validators live in a caller-owned [`ValidatorCache`] rather than
//! in process-wide statics.

use include_dir::{include_dir, Dir};
use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::{LensError, Result};

static VALIDATOR_SCHEMAS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/schemas/validators");

/// Descriptor dialect a validator is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Typeorm,
    Sequelize,
    Unknown,
}

impl DescriptorKind {
    /// Guess the dialect from top-level keys; `None` when ambiguous
    pub fn detect(descriptor: &Value) -> Option<Self> {
        let has_name = descriptor.get("name").is_some();
        let typeorm = has_name && (descriptor.get("columns").is_some() || descriptor.get("relations").is_some());
        let sequelize = has_name && descriptor.get("attributes").is_some();

        match (typeorm, sequelize) {
            (true, false) => Some(Self::Typeorm),
            (false, true) => Some(Self::Sequelize),
            _ => None,
        }
    }

    fn schema_file(&self) -> Option<&'static str> {
        match self {
            Self::Typeorm => Some("typeorm-entity.schema.json"),
            Self::Sequelize => Some("sequelize-model.schema.json"),
            Self::Unknown => None,
        }
    }
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// JSON pointer into the descriptor, `root` for top-level problems
    pub path: String,
    pub message: String,
}

/// Outcome of validating one descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Document the report belongs to (set by the batch parser)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub valid: bool,
    pub kind: DescriptorKind,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// `path: message; path: message`
    pub fn summary(&self) -> String {
        if self.issues.is_empty() {
            return if self.valid {
                String::new()
            } else {
                "Unknown validation error".to_string()
            };
        }

        self.issues
            .iter()
            .map(|issue| format!("{}: {}", issue.path, issue.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Lazily compiled descriptor validators.
///
/// Each validator is compiled on first lookup and reused afterwards;
/// [`ValidatorCache::preload`] compiles all of them up front.
#[derive(Default)]
pub struct ValidatorCache {
    typeorm: OnceLock<JSONSchema>,
    sequelize: OnceLock<JSONSchema>,
}

impl ValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every embedded validator now
    pub fn preload(&self) -> Result<()> {
        self.validator(DescriptorKind::Typeorm)?;
        self.validator(DescriptorKind::Sequelize)?;
        Ok(())
    }

    /// Whether the validator for `kind` has been compiled
    pub fn is_loaded(&self, kind: DescriptorKind) -> bool {
        match kind {
            DescriptorKind::Typeorm => self.typeorm.get().is_some(),
            DescriptorKind::Sequelize => self.sequelize.get().is_some(),
            DescriptorKind::Unknown => false,
        }
    }

    /// Look up (compiling on first use) the validator for `kind`
    pub fn validator(&self, kind: DescriptorKind) -> Result<&JSONSchema> {
        let cell = match kind {
            DescriptorKind::Typeorm => &self.typeorm,
            DescriptorKind::Sequelize => &self.sequelize,
            DescriptorKind::Unknown => {
                return Err(LensError::Validator("no validator for unknown descriptor kind".to_string()))
            }
        };

        if let Some(compiled) = cell.get() {
            return Ok(compiled);
        }

        let compiled = compile(kind)?;
        Ok(cell.get_or_init(|| compiled))
    }

    /// Validate against one specific dialect
    pub fn validate_as(&self, kind: DescriptorKind, descriptor: &Value) -> ValidationReport {
        let validator = match self.validator(kind) {
            Ok(v) => v,
            Err(e) => {
                return ValidationReport {
                    document: None,
                    valid: false,
                    kind,
                    issues: vec![ValidationIssue {
                        path: "root".to_string(),
                        message: format!("Validation error: {}", e),
                    }],
                }
            }
        };

        let issues: Vec<ValidationIssue> = match validator.validate(descriptor) {
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

        ValidationReport {
            document: None,
            valid: issues.is_empty(),
            kind,
            issues,
        }
    }

    /// Detect the dialect and validate.
    ///
    /// Ambiguous descriptors are tried as TypeORM, then Sequelize; when both
    /// fail the TypeORM issues are reported with kind `Unknown`.
    pub fn validate(&self, descriptor: &Value) -> ValidationReport {
        if let Some(kind) = DescriptorKind::detect(descriptor) {
            return self.validate_as(kind, descriptor);
        }

        let typeorm = self.validate_as(DescriptorKind::Typeorm, descriptor);
        if typeorm.valid {
            return typeorm;
        }

        let sequelize = self.validate_as(DescriptorKind::Sequelize, descriptor);
        if sequelize.valid {
            return sequelize;
        }

        ValidationReport { kind: DescriptorKind::Unknown, ..typeorm }
    }
}

fn compile(kind: DescriptorKind) -> Result<JSONSchema> {
    let file_name = kind
        .schema_file()
        .ok_or_else(|| LensError::Validator(format!("no schema for {:?}", kind)))?;

    let contents = VALIDATOR_SCHEMAS
        .get_file(file_name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| LensError::Validator(format!("embedded schema {} missing", file_name)))?;

    let schema: Value = serde_json::from_str(contents)?;
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|e| LensError::Validator(format!("{}: {}", file_name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_kind() {
        assert_eq!(DescriptorKind::detect(&json!({ "name": "A", "columns": {} })), Some(DescriptorKind::Typeorm));
        assert_eq!(DescriptorKind::detect(&json!({ "name": "A", "attributes": {} })), Some(DescriptorKind::Sequelize));
        assert_eq!(DescriptorKind::detect(&json!({ "tableName": "a" })), None);
    }

    #[test]
    fn test_cache_is_lazy() {
        let cache = ValidatorCache::new();
        assert!(!cache.is_loaded(DescriptorKind::Typeorm));

        let report = cache.validate(&json!({ "name": "User", "columns": { "id": { "type": "int", "primary": true } } }));
        assert!(report.valid, "{}", report.summary());
        assert_eq!(report.kind, DescriptorKind::Typeorm);
        assert!(cache.is_loaded(DescriptorKind::Typeorm));
        assert!(!cache.is_loaded(DescriptorKind::Sequelize));

        cache.preload().unwrap();
        assert!(cache.is_loaded(DescriptorKind::Sequelize));
    }

    #[test]
    fn test_invalid_relation_reported() {
        let cache = ValidatorCache::new();
        let report = cache.validate(&json!({
            "name": "Order",
            "relations": { "user": { "type": "belongs-to", "target": "User" } }
        }));
        assert!(!report.valid);
        assert!(report.issues.iter().any(|i| i.path == "/relations/user/type"));
        assert!(report.summary().contains("/relations/user/type"));
    }

    #[test]
    fn test_sequelize_model() {
        let cache = ValidatorCache::new();
        let report = cache.validate(&json!({
            "name": "Post",
            "attributes": { "authorId": { "type": "INTEGER", "references": { "model": "User" } } }
        }));
        assert!(report.valid, "{}", report.summary());
        assert_eq!(report.kind, DescriptorKind::Sequelize);
    }

    #[test]
    fn test_ambiguous_descriptor_falls_back_to_unknown() {
        let cache = ValidatorCache::new();
        let report = cache.validate(&json!({ "tableName": "orphans" }));
        assert!(!report.valid);
        assert_eq!(report.kind, DescriptorKind::Unknown);
        assert!(report.issues.iter().any(|i| i.path == "root"));
    }
}
