//! OpenAPI / Swagger document access
//!
//! Normalizes the differences between Swagger 2.0 and OpenAPI 3.x that the
//! schema and endpoint views care about.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use super::resolve::{schema_map, SchemaResolver};
use crate::error::{LensError, Result};

const SPEC_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

const HTTP_METHODS: [&str; 8] = ["get", "post", "put", "delete", "patch", "options", "head", "trace"];

const WRAPPER_PATTERNS: [&str; 13] = [
    r"(?i)Request$",
    r"(?i)Response$",
    r"(?i)Input$",
    r"(?i)Output$",
    r"(?i)Payload$",
    r"(?i)Body$",
    r"(?i)Dto$",
    r"^Create[A-Z]",
    r"^Update[A-Z]",
    r"^Delete[A-Z]",
    r"^Get[A-Z]",
    r"^List[A-Z]",
    r"^Search[A-Z]",
];

/// Parse spec text as JSON when it looks like JSON, YAML otherwise
pub fn parse_spec_text(text: &str) -> Result<Value> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Ok(serde_json::from_str(text)?)
    } else {
        Ok(serde_yaml::from_str(text)?)
    }
}

static WRAPPER_RULES: OnceLock<Vec<Regex>> = OnceLock::new();

/// Wrapper-name rules, compiled on first use
fn wrapper_rules() -> &'static [Regex] {
    WRAPPER_RULES.get_or_init(|| {
        WRAPPER_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Whether a schema name looks like a request/response wrapper rather than
/// a domain model
pub fn is_wrapper_name(name: &str) -> bool {
    wrapper_rules().iter().any(|re| re.is_match(name))
}

/// One operation in the endpoint list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSummary {
    pub path: String,
    /// Upper-cased HTTP method
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    pub deprecated: bool,
}

/// A parsed OpenAPI 3.x or Swagger 2.0 document
#[derive(Debug, Clone)]
pub struct SpecDocument {
    spec: Value,
    is_swagger: bool,
}

impl SpecDocument {
    pub fn new(spec: Value) -> Self {
        let is_swagger = spec.get("swagger").is_some();
        Self { spec, is_swagger }
    }

    pub fn from_text(text: &str) -> Result<Self> {
        parse_spec_text(text).map(Self::new)
    }

    /// Read a `.json`, `.yaml` or `.yml` spec file
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_lowercase();
        if !SPEC_EXTENSIONS.contains(&extension.as_str()) {
            return Err(LensError::UnsupportedFileType(path.display().to_string()));
        }
        Self::from_text(&fs::read_to_string(path)?)
    }

    pub fn raw(&self) -> &Value {
        &self.spec
    }

    pub fn is_swagger(&self) -> bool {
        self.is_swagger
    }

    /// `definitions` (Swagger 2.0) or `components.schemas`
    pub fn schemas(&self) -> Option<&Map<String, Value>> {
        schema_map(&self.spec, self.is_swagger)
    }

    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.schemas()?.get(name)
    }

    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.spec.get("paths").and_then(Value::as_object)
    }

    /// Always empty for Swagger 2.0
    pub fn webhooks(&self) -> Option<&Map<String, Value>> {
        if self.is_swagger {
            return None;
        }
        self.spec.get("webhooks").and_then(Value::as_object)
    }

    pub fn resolver(&self) -> SchemaResolver<'_> {
        SchemaResolver::new(self.schemas())
    }

    /// Resolve a named schema, or `None` if the document has no such schema
    pub fn resolve_named(&self, name: &str) -> Option<Value> {
        self.schema(name).map(|schema| self.resolver().resolve(schema))
    }

    /// Schemas whose names do not look like request/response wrappers
    pub fn domain_models(&self) -> Vec<(&str, &Value)> {
        self.schemas()
            .into_iter()
            .flatten()
            .filter(|(name, _)| !is_wrapper_name(name))
            .map(|(name, schema)| (name.as_str(), schema))
            .collect()
    }

    /// Group operations by tag; untagged operations land under `default`
    pub fn group_by_tags(&self) -> IndexMap<String, Vec<EndpointSummary>> {
        group_by_tags(self.paths())
    }
}

/// Group the operations of a paths object by tag
pub fn group_by_tags(paths: Option<&Map<String, Value>>) -> IndexMap<String, Vec<EndpointSummary>> {
    let mut grouped: IndexMap<String, Vec<EndpointSummary>> = IndexMap::new();

    for (path, item) in paths.into_iter().flatten() {
        let Some(operations) = item.as_object() else {
            continue;
        };

        for (method, operation) in operations {
            if !HTTP_METHODS.contains(&method.to_lowercase().as_str()) {
                continue;
            }

            let text = |key: &str| operation.get(key).and_then(Value::as_str).map(str::to_string);
            let summary = EndpointSummary {
                path: path.clone(),
                method: method.to_uppercase(),
                summary: text("summary"),
                description: text("description"),
                operation_id: text("operationId"),
                deprecated: operation.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
            };

            let tags: Vec<String> = match operation.get("tags").and_then(Value::as_array) {
                Some(tags) => tags.iter().filter_map(Value::as_str).map(str::to_string).collect(),
                None => vec!["default".to_string()],
            };

            for tag in tags {
                grouped.entry(tag).or_default().push(summary.clone());
            }
        }
    }

    grouped
}
