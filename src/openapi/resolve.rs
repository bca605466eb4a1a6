//! Schema Reference Resolution
//!
//! Expands `$ref`, `allOf`, `anyOf` and `oneOf` into a fully inlined schema
//! tree. References are looked up by their final path segment in the host
//! document's schema map (`definitions` for Swagger 2.0,
//! `components.schemas` for OpenAPI 3.x).
//!
//! Resolution never fails: circular and unresolvable references become
//! sentinel object schemas describing why expansion stopped.

use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Schema map of a host document
pub fn schema_map(document: &Value, is_swagger: bool) -> Option<&Map<String, Value>> {
    let schemas = if is_swagger {
        document.get("definitions")
    } else {
        document.get("components").and_then(|c| c.get("schemas"))
    };
    schemas.and_then(Value::as_object)
}

/// Final segment of a reference, with JSON pointer escapes undone
pub fn ref_name(reference: &str) -> String {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    last.replace("~1", "/").replace("~0", "~")
}

pub fn circular_sentinel(reference: &str) -> Value {
    json!({ "type": "object", "description": format!("circular reference to {}", reference) })
}

pub fn unresolved_sentinel(reference: &str) -> Value {
    json!({ "type": "object", "description": format!("unresolved reference: {}", reference) })
}

/// Resolve `schema` against `document` in one call
pub fn resolve_schema(schema: &Value, document: &Value, is_swagger: bool) -> Value {
    SchemaResolver::for_document(document, is_swagger).resolve(schema)
}

/// Resolver bound to one host document's schema map
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    schemas: Option<&'a Map<String, Value>>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schemas: Option<&'a Map<String, Value>>) -> Self {
        Self { schemas }
    }

    pub fn for_document(document: &'a Value, is_swagger: bool) -> Self {
        Self::new(schema_map(document, is_swagger))
    }

    /// Look up a reference target
    pub fn lookup(&self, reference: &str) -> Option<&'a Value> {
        self.schemas?.get(&ref_name(reference))
    }

    /// Fully resolve `schema`.
    ///
    /// The visited set only ever holds the references on the current
    /// descent path, so two sibling properties pointing at the same schema
    /// are both expanded.
    pub fn resolve(&self, schema: &Value) -> Value {
        let mut visited = HashSet::new();
        self.resolve_with(schema, &mut visited)
    }

    fn resolve_with<'s>(&self, schema: &'s Value, visited: &mut HashSet<&'s str>) -> Value
    where
        'a: 's,
    {
        let Value::Object(obj) = schema else {
            return schema.clone();
        };

        if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            return self.resolve_ref(reference, visited);
        }

        if let Some(branches) = obj.get("allOf").and_then(Value::as_array) {
            return self.merge_all_of(branches, visited);
        }

        let mut result = obj.clone();

        for keyword in ["anyOf", "oneOf"] {
            if let Some(branches) = obj.get(keyword).and_then(Value::as_array) {
                let resolved = branches.iter().map(|b| self.resolve_with(b, visited)).collect();
                result.insert(keyword.to_string(), Value::Array(resolved));
            }
        }

        if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
            let resolved: Map<String, Value> = properties
                .iter()
                .map(|(name, prop)| (name.clone(), self.resolve_with(prop, visited)))
                .collect();
            result.insert("properties".to_string(), Value::Object(resolved));
        }

        match obj.get("items") {
            Some(Value::Array(tuple)) => {
                let resolved = tuple.iter().map(|item| self.resolve_with(item, visited)).collect();
                result.insert("items".to_string(), Value::Array(resolved));
            }
            Some(items @ Value::Object(_)) => {
                result.insert("items".to_string(), self.resolve_with(items, visited));
            }
            _ => {}
        }

        if let Some(additional @ Value::Object(_)) = obj.get("additionalProperties") {
            result.insert("additionalProperties".to_string(), self.resolve_with(additional, visited));
        }

        Value::Object(result)
    }

    fn resolve_ref<'s>(&self, reference: &'s str, visited: &mut HashSet<&'s str>) -> Value
    where
        'a: 's,
    {
        if visited.contains(reference) {
            debug!(reference, "circular schema reference");
            return circular_sentinel(reference);
        }

        let Some(target) = self.lookup(reference) else {
            debug!(reference, "unresolved schema reference");
            return unresolved_sentinel(reference);
        };

        visited.insert(reference);
        let resolved = self.resolve_with(target, visited);
        visited.remove(reference);
        resolved
    }

    fn merge_all_of<'s>(&self, branches: &'s [Value], visited: &mut HashSet<&'s str>) -> Value
    where
        'a: 's,
    {
        let mut properties = Map::new();
        let mut required: Vec<Value> = Vec::new();
        let mut merged = Map::new();
        merged.insert("type".to_string(), json!("object"));

        for branch in branches {
            let Value::Object(resolved) = self.resolve_with(branch, visited) else {
                continue;
            };

            for (key, value) in resolved {
                match key.as_str() {
                    "properties" => {
                        if let Value::Object(props) = value {
                            properties.extend(props);
                        }
                    }
                    "required" => {
                        if let Value::Array(names) = value {
                            for name in names {
                                if !required.contains(&name) {
                                    required.push(name);
                                }
                            }
                        }
                    }
                    "allOf" => {}
                    _ => {
                        merged.insert(key, value);
                    }
                }
            }
        }

        merged.insert("properties".to_string(), Value::Object(properties));
        merged.insert("required".to_string(), Value::Array(required));
        Value::Object(merged)
    }
}
