//! JSON Schema fragments shared by the document builder.

use route_docs_core::{Parameter, TypeHint};
use serde_json::{json, Map, Value};

/// Component name of the shared error body schema.
pub const ERROR_SCHEMA_NAME: &str = "ErrorResponse";

/// Schema for a coarse type hint.
pub fn type_schema(hint: TypeHint) -> Value {
    match hint {
        TypeHint::String => json!({ "type": "string" }),
        TypeHint::Integer => json!({ "type": "integer" }),
        TypeHint::Number => json!({ "type": "number" }),
        TypeHint::Boolean => json!({ "type": "boolean" }),
        TypeHint::Array => json!({ "type": "array", "items": {} }),
        TypeHint::Object => json!({ "type": "object" }),
        TypeHint::Uuid => json!({ "type": "string", "format": "uuid" }),
    }
}

/// Schema of one body field, carrying the parameter description.
pub fn property_schema(param: &Parameter) -> Value {
    let mut schema = type_schema(param.type_hint);
    if let (Some(description), Some(map)) = (&param.description, schema.as_object_mut()) {
        map.insert("description".to_string(), json!(description));
    }
    schema
}

/// `content` object for a single media type.
pub fn content(media_type: &str, schema: Value) -> Value {
    let mut content = Map::new();
    content.insert(media_type.to_string(), json!({ "schema": schema }));
    Value::Object(content)
}

/// `$ref` to a component schema.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// Shape of the JSON error body every action error uses.
pub fn error_schema() -> Value {
    json!({
        "type": "object",
        "required": ["error"],
        "properties": {
            "error": {
                "type": "object",
                "required": ["code", "message", "status"],
                "properties": {
                    "code": { "type": "integer" },
                    "message": { "type": "string" },
                    "status": { "type": "string" }
                }
            }
        }
    })
}
