//! Message Schemas
//!
//! Inbound agent messages carry no explicit kind tag; their kind is decided
//! by which schema they conform to. This module defines the schema
//! descriptors, the validator seam and the built-in message schemas.

pub mod builtin;
mod validator;

pub use validator::*;

use std::fmt;

/// A named schema descriptor
#[derive(Debug, Clone)]
pub struct Schema {
    pub id: String,
    pub root: SchemaNode,
}

impl Schema {
    pub fn new(id: impl Into<String>, root: SchemaNode) -> Self {
        Self {
            id: id.into(),
            root,
        }
    }
}

/// Shape constraint for one JSON value
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Any value, including null
    Any,
    String,
    Number,
    Boolean,
    Object(ObjectSchema),
    Array {
        items: Box<SchemaNode>,
        min_items: usize,
    },
    /// Exactly one alternative must match
    OneOf(Vec<SchemaNode>),
}

impl SchemaNode {
    /// Array of `items` with no length constraint
    pub fn array_of(items: SchemaNode) -> Self {
        Self::Array {
            items: Box::new(items),
            min_items: 0,
        }
    }

    /// Array of `items` holding at least one element
    pub fn non_empty_array_of(items: SchemaNode) -> Self {
        Self::Array {
            items: Box::new(items),
            min_items: 1,
        }
    }
}

/// Object constraint
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub required: Vec<(String, SchemaNode)>,
    pub optional: Vec<(String, SchemaNode)>,
    /// Whether properties not listed above are allowed
    pub additional_properties: bool,
    pub min_properties: usize,
}

impl ObjectSchema {
    /// Object accepting only the listed properties
    pub fn strict() -> Self {
        Self::default()
    }

    /// Object accepting properties beyond the listed ones
    pub fn open() -> Self {
        Self {
            additional_properties: true,
            ..Default::default()
        }
    }

    pub fn required(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.required.push((name.into(), node));
        self
    }

    pub fn optional(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.optional.push((name.into(), node));
        self
    }

    pub fn min_properties(mut self, min: usize) -> Self {
        self.min_properties = min;
        self
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(object: ObjectSchema) -> Self {
        SchemaNode::Object(object)
    }
}

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Location of the offending value, e.g. `/0/n`
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Validates messages against schema descriptors
///
/// Conformance is an empty error list; non-conformance is a normal outcome,
/// never a failure of the validator itself.
pub trait SchemaValidator: Send + Sync + 'static {
    fn validate(&self, message: &serde_json::Value, schema: &Schema) -> Vec<ValidationError>;

    /// Whether `message` conforms to `schema`
    fn conforms(&self, message: &serde_json::Value, schema: &Schema) -> bool {
        self.validate(message, schema).is_empty()
    }
}
