//! Strict JSON schemas for structured extraction.
//!
//! Tool-input schemas are most reliable when they are fully inlined,
//! every object is closed (`additionalProperties: false`) and every
//! property is listed in `required`, nullable ones included.

use schemars::{schema_for, JsonSchema};
use serde_json::{Map, Value};

/// Generate the strict schema for `T`.
pub fn strict_schema<T: JsonSchema>() -> Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    let definitions = value.get("definitions").cloned().unwrap_or(Value::Null);
    inline_refs(&mut value, &definitions);
    close_objects(&mut value);

    if let Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
    }
    value
}

/// Property names of an object schema.
pub fn property_names(schema: &Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|path| path.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut inlined) = target {
                inline_refs(&mut inlined, definitions);
                map.remove("$ref");
                merge_into(map, inlined);
                return;
            }

            for nested in map.values_mut() {
                inline_refs(nested, definitions);
            }
        }
        Value::Array(items) => {
            for item in items {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

// Keys already on the referencing schema (e.g. a field description) win.
fn merge_into(map: &mut Map<String, Value>, inlined: Value) {
    if let Value::Object(fields) = inlined {
        for (key, field) in fields {
            map.entry(key).or_insert(field);
        }
    }
}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                if let Some(Value::Object(props)) = map.get("properties") {
                    let required = props.keys().cloned().map(Value::String).collect();
                    map.insert("required".to_string(), Value::Array(required));
                }
            }
            for nested in map.values_mut() {
                close_objects(nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                close_objects(item);
            }
        }
        _ => {}
    }
}
