//! Structural schema validator.

use serde_json::Value;

use super::{ObjectSchema, Schema, SchemaNode, SchemaValidator, ValidationError};

/// Built-in validator walking a [`SchemaNode`] tree
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl SchemaValidator for StructuralValidator {
    fn validate(&self, message: &Value, schema: &Schema) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check(&schema.root, message, "", &mut errors);
        errors
    }
}

fn check(node: &SchemaNode, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match node {
        SchemaNode::Any => {}
        SchemaNode::String => expect(value.is_string(), "string", value, path, errors),
        SchemaNode::Number => expect(value.is_number(), "number", value, path, errors),
        SchemaNode::Boolean => expect(value.is_boolean(), "boolean", value, path, errors),
        SchemaNode::Object(object) => match value.as_object() {
            Some(map) => check_object(object, map, path, errors),
            None => expect(false, "object", value, path, errors),
        },
        SchemaNode::Array { items, min_items } => match value.as_array() {
            Some(list) => {
                if list.len() < *min_items {
                    errors.push(ValidationError::new(
                        path,
                        format!("expected at least {} items, found {}", min_items, list.len()),
                    ));
                }
                for (i, item) in list.iter().enumerate() {
                    check(items, item, &format!("{}/{}", path, i), errors);
                }
            }
            None => expect(false, "array", value, path, errors),
        },
        SchemaNode::OneOf(alternatives) => {
            let matching = alternatives
                .iter()
                .filter(|alt| {
                    let mut scratch = Vec::new();
                    check(alt, value, path, &mut scratch);
                    scratch.is_empty()
                })
                .count();
            if matching != 1 {
                errors.push(ValidationError::new(
                    path,
                    format!("expected exactly one alternative to match, {} did", matching),
                ));
            }
        }
    }
}

fn check_object(
    object: &ObjectSchema,
    map: &serde_json::Map<String, Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    if map.len() < object.min_properties {
        errors.push(ValidationError::new(
            path,
            format!("expected at least {} properties", object.min_properties),
        ));
    }

    for (name, node) in &object.required {
        match map.get(name) {
            Some(v) => check(node, v, &format!("{}/{}", path, name), errors),
            None => errors.push(ValidationError::new(
                path,
                format!("missing required property '{}'", name),
            )),
        }
    }

    for (name, node) in &object.optional {
        if let Some(v) = map.get(name) {
            check(node, v, &format!("{}/{}", path, name), errors);
        }
    }

    if !object.additional_properties {
        for key in map.keys() {
            let known = object
                .required
                .iter()
                .chain(object.optional.iter())
                .any(|(name, _)| name == key);
            if !known {
                errors.push(ValidationError::new(
                    path,
                    format!("unexpected property '{}'", key),
                ));
            }
        }
    }
}

fn expect(ok: bool, wanted: &str, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    if !ok {
        errors.push(ValidationError::new(
            path,
            format!("expected {}, found {}", wanted, kind_of(value)),
        ));
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
