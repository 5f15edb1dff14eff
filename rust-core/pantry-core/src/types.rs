//! # Field Types
//!
//! Type predicates applied to incoming request fields.
//!
//! Values arrive as text (query strings, form bodies, stringified JSON
//! scalars) and are checked and converted here before they are bound to
//! SQL statements.

use crate::error::{Error, Result};

/// Expected type of a request field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    /// Any text - no conversion
    #[default]
    Text,
    /// Decimal integer, parses to i64
    Int,
    /// ASCII letters only
    Alpha,
}

/// Converted field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text value (no conversion performed)
    Text(String),
    /// Integer value (i64)
    Int(i64),
}

impl FieldValue {
    /// Get as i64 if Int variant
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Text(_) => None,
        }
    }

    /// Get as &str if Text variant
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

/// Whether `raw` is a decimal integer literal: optional sign, no leading zeros.
#[must_use]
pub fn is_int_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    digits == "0" || !digits.starts_with('0')
}

/// Whether `raw` is non-empty and made only of ASCII letters.
#[must_use]
pub fn is_alpha(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Convert raw text to a typed value based on `FieldType`
///
/// # Errors
///
/// Returns `Error::MalformedBody` if the text does not satisfy the type.
pub fn convert_field(raw: &str, field_type: FieldType) -> Result<FieldValue> {
    match field_type {
        FieldType::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldType::Int => {
            if !is_int_literal(raw) {
                return Err(Error::MalformedBody {
                    reason: format!("Cannot convert '{raw}' to integer"),
                });
            }
            raw.parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|e| Error::MalformedBody {
                    reason: format!("Cannot convert '{raw}' to integer: {e}"),
                })
        }
        FieldType::Alpha => {
            if is_alpha(raw) {
                Ok(FieldValue::Text(raw.to_string()))
            } else {
                Err(Error::MalformedBody {
                    reason: format!("'{raw}' is not alphabetic"),
                })
            }
        }
    }
}
