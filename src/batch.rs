//! Batch parsing
//!
//! A batch is one upload: every document is parsed first, and only once the
//! complete entity map exists are relations analyzed against it. A fresh
//! batch fully replaces the previous graph.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyzer::analyze_relations;
use crate::checksum::Checksum;
use crate::descriptor::{parse_descriptor, SourceDocument};
use crate::model::{EntityMap, Relation};
use crate::validate::{ValidationReport, ValidatorCache};

/// A document that could not be turned into an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub name: String,
    pub reason: String,
}

/// Result of one parse-all-then-analyze pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedBatch {
    pub entities: EntityMap,
    pub relations: Vec<Relation>,
    pub failures: Vec<DocumentFailure>,
    /// Validator reports for documents that did not pass schema validation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ValidationReport>,
    pub fingerprint: Checksum,
}

/// How a collaborator should describe a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Nothing uploaded
    Empty,
    /// Every document was malformed
    AllFailed(usize),
    Parsed { entities: usize, failures: usize },
}

impl ParsedBatch {
    pub fn outcome(&self) -> BatchOutcome {
        match (self.entities.len(), self.failures.len()) {
            (0, 0) => BatchOutcome::Empty,
            (0, failures) => BatchOutcome::AllFailed(failures),
            (entities, failures) => BatchOutcome::Parsed { entities, failures },
        }
    }
}

/// Parses upload batches, optionally validating each descriptor
#[derive(Default)]
pub struct BatchParser<'a> {
    validators: Option<&'a ValidatorCache>,
}

impl<'a> BatchParser<'a> {
    pub fn new() -> Self {
        Self { validators: None }
    }

    /// Attach descriptor validation; reports land in [`ParsedBatch::diagnostics`]
    pub fn with_validation(validators: &'a ValidatorCache) -> Self {
        Self { validators: Some(validators) }
    }

    pub fn parse(&self, documents: &[SourceDocument]) -> ParsedBatch {
        let mut entities = EntityMap::new();
        let mut collected: Vec<Relation> = Vec::new();
        let mut failures = Vec::new();
        let mut diagnostics = Vec::new();

        for doc in documents {
            let parsed = doc.descriptor().and_then(|descriptor| {
                if let Some(cache) = self.validators {
                    let report = cache.validate(&descriptor);
                    if !report.valid {
                        debug!(document = %doc.name, issues = report.issues.len(), "descriptor failed validation");
                        diagnostics.push(ValidationReport { document: Some(doc.name.clone()), ..report });
                    }
                }
                parse_descriptor(&descriptor, &doc.name)
            });

            match parsed {
                Ok(entity) => {
                    collected.extend(entity.relations.iter().cloned());
                    if entities.contains_key(&entity.name) {
                        warn!(entity = %entity.name, document = %doc.name, "entity redeclared, replacing earlier definition");
                    }
                    entities.insert(entity.name.clone(), entity);
                }
                Err(e) => {
                    warn!(document = %doc.name, error = %e, "failed to parse document");
                    failures.push(DocumentFailure {
                        name: doc.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let relations = analyze_relations(collected, &entities);
        debug!(
            entities = entities.len(),
            relations = relations.len(),
            failures = failures.len(),
            "batch parsed"
        );

        ParsedBatch {
            entities,
            relations,
            failures,
            diagnostics,
            fingerprint: fingerprint(documents),
        }
    }
}

/// SHA-256 over `name NUL content NUL` for each document, in order
pub fn fingerprint(documents: &[SourceDocument]) -> Checksum {
    let bytes: Vec<_> = documents.iter().map(|d| d.bytes()).collect();
    Checksum::from_chunks(
        documents
            .iter()
            .zip(bytes.iter())
            .flat_map(|(doc, content)| [doc.name.as_bytes(), b"\0".as_slice(), &content[..], b"\0".as_slice()]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_batch() {
        let batch = BatchParser::new().parse(&[]);
        assert_eq!(batch.outcome(), BatchOutcome::Empty);
    }

    #[test]
    fn test_malformed_document_is_isolated() {
        let docs = vec![
            SourceDocument::text("broken.json", "{ \"name\": "),
            SourceDocument::json("user.json", json!({ "name": "User", "columns": { "id": { "type": "int", "primary": true } } })),
            SourceDocument::text("nothing.entity.js", "module.exports = {};"),
        ];

        let batch = BatchParser::new().parse(&docs);
        assert_eq!(batch.outcome(), BatchOutcome::Parsed { entities: 1, failures: 2 });
        assert_eq!(batch.failures[0].name, "broken.json");
        assert_eq!(batch.failures[1].name, "nothing.entity.js");
    }

    #[test]
    fn test_all_failed() {
        let batch = BatchParser::new().parse(&[SourceDocument::text("a.json", "not json")]);
        assert_eq!(batch.outcome(), BatchOutcome::AllFailed(1));
    }

    #[test]
    fn test_later_document_supplies_target() {
        let docs = vec![
            SourceDocument::json(
                "order.json",
                json!({ "name": "Order", "relations": { "user": { "type": "many-to-one", "target": "User" } } }),
            ),
            SourceDocument::json("user.json", json!({ "name": "User" })),
        ];

        let batch = BatchParser::new().parse(&docs);
        assert_eq!(batch.relations.len(), 1);
        assert_eq!(batch.relations[0].id, "Order.user_id-User.id");
    }

    #[test]
    fn test_redeclared_entity_replaced_in_place() {
        let docs = vec![
            SourceDocument::json("a.json", json!({ "name": "A", "columns": { "x": "int" } })),
            SourceDocument::json("b.json", json!({ "name": "B" })),
            SourceDocument::json("a2.json", json!({ "name": "A", "columns": { "y": "int" } })),
        ];

        let batch = BatchParser::new().parse(&docs);
        let names: Vec<_> = batch.entities.keys().cloned().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(batch.entities["A"].has_column("y"));
        assert!(!batch.entities["A"].has_column("x"));
    }

    #[test]
    fn test_validation_diagnostics_do_not_fail_documents() {
        let cache = ValidatorCache::new();
        let docs = vec![SourceDocument::json(
            "order.json",
            json!({ "name": "Order", "relations": { "user": { "type": "belongs-to", "target": "User" } } }),
        )];

        let batch = BatchParser::with_validation(&cache).parse(&docs);
        assert!(batch.failures.is_empty());
        assert_eq!(batch.entities.len(), 1);
        assert_eq!(batch.diagnostics.len(), 1);
        assert_eq!(batch.diagnostics[0].document.as_deref(), Some("order.json"));
    }

    #[test]
    fn test_fingerprint_tracks_content_and_order() {
        let a = SourceDocument::text("a.json", "{}");
        let b = SourceDocument::text("b.json", "{}");

        assert_eq!(fingerprint(&[a.clone(), b.clone()]), fingerprint(&[a.clone(), b.clone()]));
        assert_ne!(fingerprint(&[a.clone(), b.clone()]), fingerprint(&[b, a]));
    }
}
