//! Component Record
//!
//! The unit stored by the sensor store. Identifying fields are kept as raw
//! JSON values so lookups can tell a string `"33"` apart from the number `33`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A component (sensor or actuator) attached to the device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Store-generated identifier
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub cid: Option<Value>,

    /// `None` when the key is absent, `Some(Value::Null)` for an explicit null
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,

    #[serde(
        rename = "type",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<Value>,

    /// Caller-supplied fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Component {
    /// Create a component with the given name and type
    pub fn new(name: impl Into<Value>, kind: impl Into<Value>) -> Self {
        Self {
            cid: None,
            name: Some(name.into()),
            kind: Some(kind.into()),
            extra: Map::new(),
        }
    }

    /// Attach an extra field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Get the cid as a string, if it is one
    pub fn cid_str(&self) -> Option<&str> {
        self.cid.as_ref().and_then(Value::as_str)
    }

    /// Structural match on name and type, ignoring cid and extra fields
    pub fn same_identity(&self, other: &Component) -> bool {
        opt_strict_eq(self.name.as_ref(), other.name.as_ref())
            && opt_strict_eq(self.kind.as_ref(), other.kind.as_ref())
    }
}

/// Keeps an explicit `null` distinct from a missing key
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Type-and-value equality.
///
/// Numbers compare by value regardless of their integer/float encoding;
/// everything else falls back to JSON equality, so `"33"` never equals `33`.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn opt_strict_eq(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => strict_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
