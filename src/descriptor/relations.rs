//! Relation dialects
//!
//! Two shapes are accepted: the TypeORM object map keyed by relation name,
//! and the legacy list of explicit `fromColumn`/`toEntity` entries.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{non_empty_str, truthy};
use crate::model::{Cascade, Column, Relation, RelationType};

/// Owning join column resolved from relation metadata
#[derive(Debug, PartialEq)]
struct JoinColumn {
    name: String,
    referenced: String,
}

impl JoinColumn {
    fn new(name: impl Into<String>, referenced: impl Into<String>) -> Self {
        Self { name: name.into(), referenced: referenced.into() }
    }
}

/// Object-map dialect. Synthesizes missing join columns into `columns`.
///
/// Only owning sides are materialized: `one-to-many` entries are skipped,
/// and so is any entry whose join column cannot be determined.
pub(super) fn from_map(
    relations: &Map<String, Value>,
    entity: &str,
    columns: &mut Vec<Column>,
) -> Vec<Relation> {
    let mut parsed = Vec::new();

    for (relation_name, def) in relations {
        let declared = def.get("type").and_then(|v| v.as_str());
        if declared == Some("one-to-many") {
            debug!(entity, relation = %relation_name, "skipping inverse one-to-many side");
            continue;
        }

        let Some(target) = non_empty_str(def.get("target")) else {
            warn!(entity, relation = %relation_name, "relation without target skipped");
            continue;
        };

        let Some(join) = owning_join(relation_name, def, declared) else {
            debug!(entity, relation = %relation_name, "no owning join column, relation not tracked");
            continue;
        };

        if !columns.iter().any(|c| c.name == join.name) {
            columns.push(Column::join_column(
                join.name.clone(),
                def.get("nullable") != Some(&Value::Bool(false)),
                declared == Some("one-to-one"),
            ));
        }

        let relation = Relation::new(
            RelationType::from_declared(declared),
            entity,
            join.name,
            target,
            join.referenced,
            relation_name.as_str(),
        )
        .with_actions(action(def, "onDelete"), action(def, "onUpdate"))
        .with_cascade(cascade(def));

        parsed.push(relation);
    }

    parsed
}

/// Legacy list dialect: entries carry their own columns, nothing is synthesized
pub(super) fn from_list(relations: &[Value], entity: &str) -> Vec<Relation> {
    let mut parsed = Vec::new();

    for rel in relations {
        let from_column = non_empty_str(rel.get("fromColumn")).or_else(|| non_empty_str(rel.get("column")));
        let to_entity = non_empty_str(rel.get("toEntity")).or_else(|| non_empty_str(rel.get("entity")));

        let (Some(from_column), Some(to_entity)) = (from_column, to_entity) else {
            warn!(entity, "relation entry without fromColumn/toEntity skipped");
            continue;
        };

        let to_column = non_empty_str(rel.get("toColumn")).unwrap_or("id");
        let name = non_empty_str(rel.get("name")).unwrap_or(from_column);

        let relation = Relation::new(
            RelationType::from_declared(rel.get("type").and_then(|v| v.as_str())),
            entity,
            from_column,
            to_entity,
            to_column,
            name,
        )
        .with_actions(action(rel, "onDelete"), action(rel, "onUpdate"))
        .with_cascade(cascade(rel));

        parsed.push(relation);
    }

    parsed
}

/// Join column precedence:
/// `joinTable.joinColumn.name` > `joinColumn.name` > `joinColumn: true`
/// > implicit `<relation>_id` for a bare many-to-one.
///
/// A present `joinColumn` that carries no `name` (an object without one,
/// or an array) names nothing and blocks the implicit fallback.
fn owning_join(relation_name: &str, def: &Value, declared: Option<&str>) -> Option<JoinColumn> {
    if let Some(join_table) = def.get("joinTable").filter(|v| truthy(Some(*v))) {
        return named_join(join_table.get("joinColumn")?);
    }

    if let Some(join) = def.get("joinColumn").filter(|v| truthy(Some(*v))) {
        return match join {
            Value::Bool(true) => Some(JoinColumn::new(format!("{}Id", relation_name), "id")),
            Value::Object(_) => named_join(join),
            _ => None,
        };
    }

    if declared == Some("many-to-one") {
        return Some(JoinColumn::new(format!("{}_id", relation_name), "id"));
    }

    None
}

/// `{ name, referencedColumnName }` with a non-empty `name`
fn named_join(join: &Value) -> Option<JoinColumn> {
    let name = non_empty_str(join.get("name"))?;
    let referenced = non_empty_str(join.get("referencedColumnName")).unwrap_or("id");
    Some(JoinColumn::new(name, referenced))
}

fn action(def: &Value, key: &str) -> Option<String> {
    def.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn cascade(def: &Value) -> Option<Cascade> {
    def.get("cascade")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}
