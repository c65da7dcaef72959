//! Structural description of resource data.
//!
//! A [`Schema`] documents the shape a fetcher returns and drives mock
//! synthesis. It is not a full JSON Schema validator: each node has a kind and,
//! for containers, the schema of its children. The serialized form follows the
//! JSON Schema vocabulary (`type`, `properties`, `items`) so artifacts stay
//! readable by other tooling.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Recursive description of a value's shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    Object {
        #[serde(default)]
        properties: BTreeMap<String, Schema>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Box<Schema>>,
    },
    String,
    Integer,
    Number,
    Boolean,
    /// Any value. Serialized with `"type": "unknown"`; objects without a
    /// `type` and unrecognised type names deserialize to this variant.
    Unknown,
}

/// Wire form of a typed schema node.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedSchema {
    Object {
        #[serde(default)]
        properties: BTreeMap<String, Schema>,
    },
    Array {
        #[serde(default)]
        items: Option<Box<Schema>>,
    },
    String,
    Integer,
    Number,
    Boolean,
    #[serde(other)]
    Unknown,
}

impl From<TaggedSchema> for Schema {
    fn from(tagged: TaggedSchema) -> Self {
        match tagged {
            TaggedSchema::Object { properties } => Schema::Object { properties },
            TaggedSchema::Array { items } => Schema::Array { items },
            TaggedSchema::String => Schema::String,
            TaggedSchema::Integer => Schema::Integer,
            TaggedSchema::Number => Schema::Number,
            TaggedSchema::Boolean => Schema::Boolean,
            TaggedSchema::Unknown => Schema::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        if node.as_object().is_some_and(|map| !map.contains_key("type")) {
            return Ok(Schema::Unknown);
        }
        TaggedSchema::deserialize(node)
            .map(Schema::from)
            .map_err(D::Error::custom)
    }
}

/// A value that does not conform to its declared [`Schema`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("value at '{path}' is not a valid {expected}")]
pub struct SchemaViolation {
    pub path: String,
    pub expected: &'static str,
}

impl Schema {
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Object {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn array_of(items: Schema) -> Self {
        Schema::Array {
            items: Some(Box::new(items)),
        }
    }

    /// Infers a schema from the runtime shape of `value`.
    ///
    /// Arrays take the schema of their first element; an empty array yields an
    /// array schema without items. `null` has no useful shape and maps to
    /// [`Schema::Unknown`].
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Object(map) => Schema::Object {
                properties: map
                    .iter()
                    .map(|(k, v)| (k.clone(), Schema::infer(v)))
                    .collect(),
            },
            Value::Array(items) => Schema::Array {
                items: items.first().map(|first| Box::new(Schema::infer(first))),
            },
            Value::String(_) => Schema::String,
            Value::Number(n) if n.is_i64() || n.is_u64() => Schema::Integer,
            Value::Number(_) => Schema::Number,
            Value::Bool(_) => Schema::Boolean,
            Value::Null => Schema::Unknown,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Schema::Object { .. } => "object",
            Schema::Array { .. } => "array",
            Schema::String => "string",
            Schema::Integer => "integer",
            Schema::Number => "number",
            Schema::Boolean => "boolean",
            Schema::Unknown => "unknown",
        }
    }

    /// Checks that `value` conforms to this schema.
    ///
    /// Objects may carry properties beyond the declared ones, but every
    /// declared property must be present and valid.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), SchemaViolation> {
        let violation = || SchemaViolation {
            path: path.to_string(),
            expected: self.kind(),
        };
        match (self, value) {
            (Schema::Unknown, _) => Ok(()),
            (Schema::Object { properties }, Value::Object(map)) => {
                for (name, child) in properties {
                    let child_path = format!("{path}.{name}");
                    match map.get(name) {
                        Some(v) => child.validate_at(&child_path, v)?,
                        None => {
                            return Err(SchemaViolation {
                                path: child_path,
                                expected: child.kind(),
                            })
                        }
                    }
                }
                Ok(())
            }
            (Schema::Array { items }, Value::Array(values)) => {
                if let Some(items) = items {
                    for (i, v) in values.iter().enumerate() {
                        items.validate_at(&format!("{path}[{i}]"), v)?;
                    }
                }
                Ok(())
            }
            (Schema::String, Value::String(_)) => Ok(()),
            (Schema::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
            (Schema::Number, Value::Number(_)) => Ok(()),
            (Schema::Boolean, Value::Bool(_)) => Ok(()),
            _ => Err(violation()),
        }
    }
}
