//! Schema validation.
//!
//! Walks a decoded document against an [`ObjectSchema`], applying defaults
//! and returning the normalized document. Object keys are visited in sorted
//! order so the reported violation is stable across runs.

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult, ValidationRule};
use crate::schema::{Field, ObjectSchema, SchemaNode};

const ROOT: &str = "<root>";

/// Validate `document` against `schema`.
///
/// Returns the document with defaults applied for absent optional keys.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] for the first missing required
/// key, type mismatch, unknown key in a strict object or disallowed `null`.
pub fn validate(schema: &ObjectSchema, document: Value) -> ConfigResult<Value> {
    validate_object(schema, document, "")
}

fn validate_object(schema: &ObjectSchema, value: Value, path: &str) -> ConfigResult<Value> {
    let mut map = match value {
        Value::Object(map) => map,
        other => return Err(type_mismatch(path, "object", &other)),
    };

    if !schema.allow_unknown {
        reject_unknown_keys(schema, &map, path)?;
    }

    for (name, field) in &schema.fields {
        let field_path = child_path(path, name);
        let supplied = map.remove(name);
        let value = match (supplied, &field.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default.clone(),
            (None, None) if field.required => {
                return Err(ConfigError::ValidationError {
                    field: field_path,
                    rule: ValidationRule::MissingRequired,
                    message: format!("the key '{name}' is required"),
                });
            },
            (None, None) => continue,
        };
        map.insert(name.clone(), validate_field(field, value, &field_path)?);
    }

    Ok(Value::Object(map))
}

fn reject_unknown_keys(
    schema: &ObjectSchema,
    map: &Map<String, Value>,
    path: &str,
) -> ConfigResult<()> {
    let mut unknown: Vec<&String> = map
        .keys()
        .filter(|key| !schema.fields.contains_key(key.as_str()))
        .collect();
    unknown.sort();

    match unknown.first() {
        Some(key) => {
            let expected: Vec<&str> = schema.fields.keys().map(String::as_str).collect();
            Err(ConfigError::ValidationError {
                field: child_path(path, key),
                rule: ValidationRule::UnknownKey,
                message: format!(
                    "unrecognized option '{key}'; available options: {}",
                    expected.join(", ")
                ),
            })
        },
        None => Ok(()),
    }
}

fn validate_field(field: &Field, value: Value, path: &str) -> ConfigResult<Value> {
    if value.is_null() {
        if field.nullable {
            return Ok(Value::Null);
        }
        return Err(ConfigError::ValidationError {
            field: display_path(path),
            rule: ValidationRule::NotNullable,
            message: format!("expected {}, got null", field.node.kind()),
        });
    }
    validate_node(&field.node, value, path)
}

fn validate_node(node: &SchemaNode, value: Value, path: &str) -> ConfigResult<Value> {
    match (node, value) {
        (SchemaNode::Any, v) => Ok(v),
        (SchemaNode::String, v @ Value::String(_))
        | (SchemaNode::Boolean, v @ Value::Bool(_))
        | (SchemaNode::Number, v @ Value::Number(_)) => Ok(v),
        (SchemaNode::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Ok(Value::Number(n))
        },
        (SchemaNode::Array(item), Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, v)| validate_node(item, v, &format!("{path}[{index}]")))
            .collect::<ConfigResult<Vec<_>>>()
            .map(Value::Array),
        (SchemaNode::Object(schema), v) => validate_object(schema, v, path),
        (node, other) => Err(type_mismatch(path, node.kind(), &other)),
    }
}

fn type_mismatch(path: &str, expected: &str, found: &Value) -> ConfigError {
    ConfigError::ValidationError {
        field: display_path(path),
        rule: ValidationRule::TypeMismatch,
        message: format!("expected {expected}, got {}", json_kind(found)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        ROOT.to_owned()
    } else {
        path.to_owned()
    }
}
