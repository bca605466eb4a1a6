//! Example values for resolved schemas

use serde_json::{json, Map, Value};

const MAX_DEPTH: usize = 3;

/// Build one representative value for a resolved schema.
///
/// `None` means "no value": the schema is missing or nesting went past the
/// depth limit. Absent property values are left out of objects; an absent
/// array item becomes `null`.
pub fn build_example(schema: &Value) -> Option<Value> {
    example_at(schema, 0)
}

fn example_at(schema: &Value, depth: usize) -> Option<Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    let obj = schema.as_object()?;

    if let Some(example) = obj.get("example") {
        return Some(example.clone());
    }

    if let Some(first) = obj.get("enum").and_then(Value::as_array).and_then(|values| values.first()) {
        return Some(first.clone());
    }

    let example = match obj.get("type").and_then(Value::as_str) {
        Some("string") => string_example(obj.get("format").and_then(Value::as_str)),
        Some("number") | Some("integer") => match obj.get("minimum") {
            Some(min) if min.as_f64().is_some_and(|m| m != 0.0) => min.clone(),
            _ => json!(0),
        },
        Some("boolean") => json!(true),
        Some("array") => match obj.get("items") {
            Some(items) => json!([example_at(items, depth + 1).unwrap_or(Value::Null)]),
            None => json!([]),
        },
        Some("object") => {
            let mut out = Map::new();
            if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
                for (name, prop) in properties {
                    if let Some(value) = example_at(prop, depth + 1) {
                        out.insert(name.clone(), value);
                    }
                }
            }
            Value::Object(out)
        }
        _ => Value::Null,
    };

    Some(example)
}

fn string_example(format: Option<&str>) -> Value {
    let literal = match format {
        Some("date-time") => "2024-01-01T00:00:00Z",
        Some("date") => "2024-01-01",
        Some("email") => "user@example.com",
        Some("uuid") => "123e4567-e89b-12d3-a456-426614174000",
        Some("uri") => "https://example.com",
        _ => "string",
    };
    json!(literal)
}
