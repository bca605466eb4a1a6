//! Descriptor sources
//!
//! Uploaded documents arrive as raw text (JSON or a JS module exporting a
//! TypeORM `EntitySchema`) or as an already-parsed JSON value.

use regex::{Captures, Regex};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::{LensError, Result};

/// Body of an uploaded document
#[derive(Debug, Clone)]
pub enum DocumentContent {
    Text(String),
    Json(Value),
}

/// One uploaded descriptor document
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File name as uploaded (may include a relative directory)
    pub name: String,
    pub content: DocumentContent,
}

impl SourceDocument {
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self { name: name.into(), content: DocumentContent::Text(content.into()) }
    }

    pub fn json(name: impl Into<String>, value: Value) -> Self {
        Self { name: name.into(), content: DocumentContent::Json(value) }
    }

    /// JS modules go through `EntitySchema` extraction instead of JSON parsing
    pub fn is_module(&self) -> bool {
        self.name.ends_with(".js")
    }

    /// Raw descriptor value for this document
    pub fn descriptor(&self) -> Result<Value> {
        match &self.content {
            DocumentContent::Json(value) => Ok(value.clone()),
            DocumentContent::Text(text) if self.is_module() => {
                extract_entity_schema(text).ok_or_else(|| LensError::NoEntitySchema(self.name.clone()))
            }
            DocumentContent::Text(text) => serde_json::from_str(text).map_err(|e| LensError::MalformedDocument {
                name: self.name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Bytes fed into the batch fingerprint
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match &self.content {
            DocumentContent::Text(text) => Cow::Borrowed(text.as_bytes()),
            DocumentContent::Json(value) => Cow::Owned(value.to_string().into_bytes()),
        }
    }
}

static EXTRACTOR: OnceLock<Option<EntitySchemaExtractor>> = OnceLock::new();

/// Rewrite rules that turn an `EntitySchema` object literal into JSON
struct EntitySchemaExtractor {
    schema_call: Regex,
    line_comment: Regex,
    single_quoted: Regex,
    bare_key: Regex,
    trailing_comma: Regex,
}

impl EntitySchemaExtractor {
    fn new() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            schema_call: Regex::new(r"new\s+EntitySchema\s*\(\s*(\{[\s\S]*?\})\s*\)")?,
            line_comment: Regex::new(r"(?m)^\s*//.*$")?,
            single_quoted: Regex::new(r"'((?:[^'\\]|\\.)*)'")?,
            bare_key: Regex::new(r"([{,]\s*)([A-Za-z_$][\w$]*)\s*:")?,
            trailing_comma: Regex::new(r",(\s*[}\]])")?,
        })
    }

    /// Shared instance, built on first use
    fn shared() -> Option<&'static Self> {
        EXTRACTOR.get_or_init(|| Self::new().ok()).as_ref()
    }

    fn extract(&self, js: &str) -> Option<Value> {
        let literal = self.schema_call.captures(js)?.get(1)?.as_str();

        let text = self.line_comment.replace_all(literal, "");
        let text = self.single_quoted.replace_all(&text, |caps: &Captures| {
            format!("\"{}\"", caps[1].replace("\\'", "'").replace('"', "\\\""))
        });
        let text = self.bare_key.replace_all(&text, "$1\"$2\":");
        let text = self.trailing_comma.replace_all(&text, "$1");

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "EntitySchema literal is not JSON-convertible");
                None
            }
        }
    }
}

/// Pull the object literal out of `new EntitySchema({ ... })` and read it as JSON.
///
/// Handles bare keys, single-quoted strings, trailing commas and whole-line
/// `//` comments. Anything more dynamic (functions, spreads, identifiers as
/// values) yields `None`.
pub fn extract_entity_schema(js: &str) -> Option<Value> {
    EntitySchemaExtractor::shared()?.extract(js)
}
