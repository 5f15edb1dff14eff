//! # JSON Serialization Module
//!
//! Request-body parsing with simd-json, response serialization with serde_json.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Parse JSON bytes to a typed value using simd-json
///
/// simd-json parses in place, so the buffer is clobbered.
///
/// # Errors
///
/// Returns `Error::MalformedBody` if parsing fails
fn parse_json_bytes<T: DeserializeOwned>(bytes: &mut [u8]) -> Result<T> {
    simd_json::from_slice(bytes).map_err(|e| Error::MalformedBody {
        reason: format!("Parse error: {e}"),
    })
}

/// Flatten a JSON object body into field text
///
/// Strings are taken as-is, numbers and booleans are stringified.
/// `null`, arrays and nested objects are left out, so they read as missing.
///
/// # Errors
///
/// Returns `Error::MalformedBody` if the body is not a JSON object
pub fn object_fields(body: &[u8]) -> Result<HashMap<String, String>> {
    let mut bytes = body.to_vec();
    let value: Value = parse_json_bytes(&mut bytes)?;

    let Value::Object(map) = value else {
        return Err(Error::MalformedBody {
            reason: "expected a JSON object".to_string(),
        });
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key, text))
        })
        .collect())
}

/// Serialize a value to pretty-printed JSON string
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
