//! Request DTOs for the cache HTTP surface

use serde::Deserialize;
use serde_json::Value;

/// Request body for storing an entry (PUT /entries/...)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The payload to cache
    #[serde(default)]
    pub data: Value,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.data.is_null() {
            return Some("Field 'data' is required and cannot be null".to_string());
        }
        None
    }
}

/// Validates a type tag taken from the request path.
pub fn validate_type_tag(type_tag: &str) -> Option<String> {
    if type_tag.trim().is_empty() {
        return Some("Type tag cannot be empty".to_string());
    }
    if type_tag.len() > 64 {
        return Some("Type tag exceeds maximum length of 64 characters".to_string());
    }
    None
}
