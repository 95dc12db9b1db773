//! Built-in agent message schemas.
//!
//! Registration: `{"n": "<name>", "t": "<type>"}`.
//! Submission: `{"n": "<name>", "v": <value>, "on": <epoch ms>, "loc": [..]}` or a list of those.
//! Device update: any non-empty subset of `name`, `loc`, `tags`, `attributes`.

use super::{ObjectSchema, Schema, SchemaNode};

pub const COMPONENT_REGISTRATION: &str = "component/registration";
pub const DATA_SUBMISSION: &str = "data/submission";
pub const DEVICE_UPDATE: &str = "device/update";

/// Component registration message
pub fn component_registration() -> Schema {
    Schema::new(
        COMPONENT_REGISTRATION,
        ObjectSchema::strict()
            .required("n", SchemaNode::String)
            .required("t", SchemaNode::String)
            .into(),
    )
}

/// Data submission message (single reading or batch)
pub fn data_submission() -> Schema {
    let reading: SchemaNode = ObjectSchema::strict()
        .required("n", SchemaNode::String)
        .required("v", SchemaNode::Any)
        .optional("on", SchemaNode::Number)
        .optional("loc", SchemaNode::array_of(SchemaNode::Number))
        .into();

    Schema::new(
        DATA_SUBMISSION,
        SchemaNode::OneOf(vec![reading.clone(), SchemaNode::non_empty_array_of(reading)]),
    )
}

/// Device metadata update message
pub fn device_update() -> Schema {
    Schema::new(
        DEVICE_UPDATE,
        ObjectSchema::strict()
            .optional("name", SchemaNode::String)
            .optional("loc", SchemaNode::array_of(SchemaNode::Number))
            .optional("tags", SchemaNode::array_of(SchemaNode::String))
            .optional("attributes", ObjectSchema::open().into())
            .min_properties(1)
            .into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaValidator, StructuralValidator};
    use serde_json::json;

    #[test]
    fn test_registration() {
        let schema = component_registration();
        let v = StructuralValidator;
        assert!(v.conforms(&json!({ "n": "temp", "t": "temperature.v1.0" }), &schema));
        assert!(!v.conforms(&json!({ "n": "temp" }), &schema));
        assert!(!v.conforms(&json!({ "n": "temp", "t": "temperature.v1.0", "v": 1 }), &schema));
    }

    #[test]
    fn test_submission() {
        let schema = data_submission();
        let v = StructuralValidator;
        assert!(v.conforms(&json!({ "n": "temp", "v": 26.5 }), &schema));
        assert!(v.conforms(&json!({ "n": "temp", "v": "on", "on": 1700000000000u64, "loc": [1.0, 2.0] }), &schema));
        assert!(v.conforms(&json!([{ "n": "temp", "v": 1 }, { "n": "hum", "v": 40 }]), &schema));
        assert!(!v.conforms(&json!([]), &schema));
        assert!(!v.conforms(&json!({ "n": "temp", "t": "temperature.v1.0" }), &schema));
    }

    #[test]
    fn test_device_update() {
        let schema = device_update();
        let v = StructuralValidator;
        assert!(v.conforms(&json!({ "tags": ["lab"], "attributes": { "fw": "1.2" } }), &schema));
        assert!(v.conforms(&json!({ "loc": [45.5, -122.6, 0] }), &schema));
        assert!(!v.conforms(&json!({}), &schema));
        assert!(!v.conforms(&json!({ "n": "temp", "v": 1 }), &schema));
    }

    #[test]
    fn test_kinds_are_disjoint() {
        let v = StructuralValidator;
        let schemas = [component_registration(), data_submission(), device_update()];
        let messages = [
            json!({ "n": "temp", "t": "temperature.v1.0" }),
            json!({ "n": "temp", "v": 21 }),
            json!({ "name": "gateway" }),
        ];
        for (i, message) in messages.iter().enumerate() {
            let matched: Vec<usize> = schemas
                .iter()
                .enumerate()
                .filter(|(_, s)| v.conforms(message, s))
                .map(|(j, _)| j)
                .collect();
            assert_eq!(matched, vec![i]);
        }
    }
}
