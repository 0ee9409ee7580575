//! Key Builder Module
//!
//! Builds deterministic cache keys from a content-type tag and an identifier.

use serde::Serialize;
use serde_json::{Map, Value};

/// Separator between the type tag and the identifier part of a key.
pub const KEY_SEPARATOR: char = '_';

// == Identifier ==
/// The identifier half of a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    /// An opaque string identifier, used verbatim
    Id(String),
    /// A structured parameter object, canonicalized before use
    Params(Value),
}

impl Identifier {
    /// Builds a structured identifier from any serializable parameter type.
    ///
    /// Parameters that fail to serialize collapse to `null` so key building
    /// stays infallible.
    pub fn params<P: Serialize + ?Sized>(params: &P) -> Self {
        Identifier::Params(serde_json::to_value(params).unwrap_or(Value::Null))
    }

    /// Returns the string form appended after the type tag.
    pub fn canonical(&self) -> String {
        match self {
            Identifier::Id(id) => id.clone(),
            Identifier::Params(value) => canonicalize(value).to_string(),
        }
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Identifier::Id(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Identifier::Id(id)
    }
}

impl From<&String> for Identifier {
    fn from(id: &String) -> Self {
        Identifier::Id(id.clone())
    }
}

impl From<Value> for Identifier {
    fn from(value: Value) -> Self {
        Identifier::Params(value)
    }
}

// == Build Key ==
/// Builds the cache key `"{type_tag}_{identifier}"`.
pub fn build_key(type_tag: &str, identifier: &Identifier) -> String {
    format!("{}{}{}", type_tag, KEY_SEPARATOR, identifier.canonical())
}

/// Rebuilds a JSON value with every object's fields in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            let mut sorted = Map::new();
            for (name, field) in fields {
                sorted.insert(name.clone(), canonicalize(field));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
