//! Entity Descriptor Parsing
//!
//! Normalizes one raw descriptor document (TypeORM `EntitySchema` objects,
//! plain JSON table definitions, legacy relation lists) into a canonical
//! [`Entity`]. Dialect handling stops at this boundary.
//!
//! Supported column shapes:
//! - array of column objects (`[{ "name": "id", "type": "int" }]`)
//! - map of name -> definition object (`{ "id": { "type": "int" } }`)
//! - map of name -> bare type string (`{ "id": "int" }`)

mod relations;
pub mod source;

pub use source::{extract_entity_schema, DocumentContent, SourceDocument};

use serde_json::Value;
use std::path::Path;
use tracing::warn;

use crate::error::{LensError, Result};
use crate::model::{Column, Entity, Index};

/// Parse a single descriptor into an entity.
///
/// `source_name` is the uploaded file name; it is only used when the
/// descriptor names neither `name` nor `tableName`.
pub fn parse_descriptor(descriptor: &Value, source_name: &str) -> Result<Entity> {
    let Some(obj) = descriptor.as_object() else {
        return Err(LensError::MalformedDocument {
            name: source_name.to_string(),
            reason: "descriptor is not an object".to_string(),
        });
    };

    let name = non_empty_str(obj.get("name"))
        .or_else(|| non_empty_str(obj.get("tableName")))
        .map(String::from)
        .unwrap_or_else(|| name_from_source(source_name));

    let mut columns = match obj.get("columns") {
        Some(cols) => parse_columns(cols, &name),
        None => Vec::new(),
    };

    let indexes = obj
        .get("indices")
        .or_else(|| obj.get("indexes"))
        .and_then(|v| v.as_array())
        .map(|items| items.iter().map(parse_index).collect())
        .unwrap_or_default();

    let relations = match obj.get("relations") {
        Some(Value::Object(map)) => relations::from_map(map, &name, &mut columns),
        Some(Value::Array(items)) => relations::from_list(items, &name),
        _ => Vec::new(),
    };

    let table_name = non_empty_str(obj.get("tableName"))
        .map(String::from)
        .unwrap_or_else(|| name.clone());

    Ok(Entity {
        name,
        table_name,
        columns,
        indexes,
        relations,
        description: obj.get("description").and_then(|v| v.as_str()).map(String::from),
    })
}

/// Derive an entity name from a file name: `Order.entity.js` -> `Order`
pub fn name_from_source(source_name: &str) -> String {
    let file = Path::new(source_name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(source_name);

    let stem = file
        .strip_suffix(".json")
        .or_else(|| file.strip_suffix(".js"))
        .map(|s| s.strip_suffix(".entity").unwrap_or(s))
        .unwrap_or(file);

    stem.to_string()
}

// =============================================================================
// Columns
// =============================================================================

fn parse_columns(columns: &Value, entity: &str) -> Vec<Column> {
    let mut parsed: Vec<Column> = Vec::new();

    let mut push = |column: Column| {
        if parsed.iter().any(|c| c.name == column.name) {
            warn!(entity, column = %column.name, "duplicate column declaration ignored");
        } else {
            parsed.push(column);
        }
    };

    match columns {
        Value::Object(map) => {
            for (name, def) in map {
                push(normalize_column(name, def));
            }
        }
        Value::Array(items) => {
            for item in items {
                match item.get("name").and_then(|v| v.as_str()) {
                    Some(name) => push(normalize_column(name, item)),
                    None => warn!(entity, "column entry without a name skipped"),
                }
            }
        }
        _ => warn!(entity, "columns must be an object or an array"),
    }

    parsed
}

/// Normalize one column definition (object or bare type string)
pub(crate) fn normalize_column(name: &str, def: &Value) -> Column {
    if let Value::String(ty) = def {
        return normalize_column(name, &serde_json::json!({ "type": ty }));
    }

    let base = def.get("type").map(text).unwrap_or_else(|| "unknown".to_string());
    let mut column_type = if truthy(def.get("length")) {
        format!("{}({})", base, text(&def["length"]))
    } else if truthy(def.get("precision")) && truthy(def.get("scale")) {
        format!("{}({},{})", base, text(&def["precision"]), text(&def["scale"]))
    } else {
        base
    };

    if let Some(values) = def.get("enum").and_then(|v| v.as_array()) {
        let rendered: Vec<String> = values.iter().map(text).collect();
        column_type = format!("enum({})", rendered.join(","));
    }

    let generated = def.get("generated");
    let auto_increment = matches!(generated, Some(Value::Bool(true)))
        || generated.and_then(|v| v.as_str()) == Some("increment")
        || truthy(def.get("autoIncrement"))
        || truthy(def.get("auto"));

    Column {
        name: name.to_string(),
        column_type,
        nullable: def.get("nullable") != Some(&Value::Bool(false)),
        unique: truthy(def.get("unique")),
        primary_key: truthy(def.get("primaryKey")) || truthy(def.get("primary")),
        auto_increment,
        default: def.get("default").cloned(),
        generated: false,
    }
}

// =============================================================================
// Indexes
// =============================================================================

fn parse_index(idx: &Value) -> Index {
    let columns = match idx.get("columns") {
        Some(Value::Array(items)) => items.iter().map(text).collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => idx.get("column").map(|c| vec![text(c)]).unwrap_or_default(),
    };

    Index {
        name: idx.get("name").and_then(|v| v.as_str()).map(String::from),
        columns,
        unique: truthy(idx.get("unique")),
        kind: idx
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("BTREE")
            .to_string(),
    }
}

// =============================================================================
// Value helpers
// =============================================================================

/// Loose truthiness for descriptor flags (`unique: 1`, `length: "50"`)
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Render a scalar without JSON quoting
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_resolution_order() {
        let named = parse_descriptor(&json!({ "name": "User", "tableName": "users" }), "x.json").unwrap();
        assert_eq!(named.name, "User");
        assert_eq!(named.table_name, "users");

        let table_only = parse_descriptor(&json!({ "tableName": "users" }), "x.json").unwrap();
        assert_eq!(table_only.name, "users");

        let derived = parse_descriptor(&json!({}), "models/Invoice.entity.js").unwrap();
        assert_eq!(derived.name, "Invoice");
        assert_eq!(derived.table_name, "Invoice");
    }

    #[test]
    fn test_name_from_source_suffixes() {
        assert_eq!(name_from_source("Order.entity.json"), "Order");
        assert_eq!(name_from_source("Order.json"), "Order");
        assert_eq!(name_from_source("Order.js"), "Order");
        assert_eq!(name_from_source("Order.yaml"), "Order.yaml");
        assert_eq!(name_from_source("entities/Product.json"), "Product");
        assert_eq!(name_from_source("entities/shop/order.entity.js"), "order");
    }

    #[test]
    fn test_column_type_annotations() {
        let col = normalize_column("code", &json!({ "type": "varchar", "length": 50 }));
        assert_eq!(col.column_type, "varchar(50)");

        let col = normalize_column("total", &json!({ "type": "decimal", "precision": 10, "scale": 2 }));
        assert_eq!(col.column_type, "decimal(10,2)");

        let col = normalize_column("status", &json!({ "type": "enum", "enum": ["new", "paid"] }));
        assert_eq!(col.column_type, "enum(new,paid)");
    }

    #[test]
    fn test_column_flags() {
        let col = normalize_column("id", &json!({ "type": "int", "primary": true, "generated": "increment" }));
        assert!(col.primary_key);
        assert!(col.auto_increment);
        assert!(col.nullable);
        assert!(!col.generated);

        let col = normalize_column("id", &json!({ "type": "uuid", "generated": "uuid", "nullable": false }));
        assert!(!col.auto_increment);
        assert!(!col.nullable);
    }

    #[test]
    fn test_column_shapes_unify() {
        let from_map = parse_descriptor(
            &json!({ "name": "T", "columns": { "id": "int", "label": { "type": "text", "default": "x" } } }),
            "t.json",
        )
        .unwrap();
        let from_list = parse_descriptor(
            &json!({ "name": "T", "columns": [
                { "name": "id", "type": "int" },
                { "name": "label", "type": "text", "default": "x" }
            ] }),
            "t.json",
        )
        .unwrap();
        assert_eq!(from_map.columns, from_list.columns);
        assert_eq!(from_map.columns[1].default, Some(json!("x")));
    }

    #[test]
    fn test_indices_preferred_over_indexes() {
        let entity = parse_descriptor(
            &json!({
                "name": "T",
                "indices": [{ "name": "idx_a", "columns": "a", "unique": true }],
                "indexes": [{ "name": "ignored", "columns": ["b"] }]
            }),
            "t.json",
        )
        .unwrap();
        assert_eq!(entity.indexes.len(), 1);
        assert_eq!(entity.indexes[0].columns, vec!["a"]);
        assert!(entity.indexes[0].unique);
        assert_eq!(entity.indexes[0].kind, "BTREE");
    }

    #[test]
    fn test_non_object_descriptor_is_malformed() {
        let err = parse_descriptor(&json!([1, 2]), "bad.json").unwrap_err();
        assert!(matches!(err, LensError::MalformedDocument { .. }));
    }

    #[test]
    fn test_unnamed_join_column_adds_nothing() {
        let entity = parse_descriptor(
            &json!({
                "name": "City",
                "relations": { "country": {
                    "type": "many-to-one", "target": "Country",
                    "joinColumn": { "referencedColumnName": "code" }
                } }
            }),
            "city.json",
        )
        .unwrap();
        assert!(entity.columns.is_empty());
        assert!(entity.relations.is_empty());
    }
}
