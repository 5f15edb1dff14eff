//! # Validation Module
//!
//! Structured validation errors and per-route validator chains.
//!
//! A route declares a [`Validator`] made of ordered [`FieldChain`]s. Each
//! chain reads one field from the request body or query string, runs its
//! steps in order (presence, sanitizers, type predicates) and stops at the
//! first failing step. All chains run, so every bad field is reported.

use crate::types::{convert_field, is_alpha, is_int_literal, FieldType, FieldValue};
use serde::Serialize;
use std::collections::HashMap;

/// Error code for categorizing validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// Required field is missing or empty
    Required,
    /// Value is invalid type
    InvalidType,
}

/// Where a field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Request body (JSON object or urlencoded form)
    Body,
    /// Query string
    Query,
}

/// A single validation error for a specific field
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Field name (e.g., `ITEM_ID`)
    pub field: String,
    /// Human-readable error message
    pub message: String,
    /// Machine-readable error code
    pub code: ValidationCode,
    /// Where the field was looked up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl FieldError {
    /// Create a new field error
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: ValidationCode) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
            location: None,
        }
    }

    /// Create a "required field" error
    pub fn required(field: impl Into<String>) -> Self {
        let field_str = field.into();
        Self {
            message: format!("{field_str} is required"),
            field: field_str,
            code: ValidationCode::Required,
            location: None,
        }
    }

    /// Attach the lookup location
    #[must_use]
    pub const fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Collection of validation errors
///
/// Serializes as `{"errors": [...]}`, the 422 response body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    /// List of field-level errors
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create an empty error collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field error
    pub fn add(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Add a required field error
    pub fn add_required(&mut self, field: impl Into<String>) {
        self.add(FieldError::required(field));
    }

    /// Check if there are any errors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Convert to JSON response body
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"errors":[]}"#.to_string())
    }

    /// Group errors by field
    #[must_use]
    pub fn by_field(&self) -> HashMap<String, Vec<&FieldError>> {
        let mut map: HashMap<String, Vec<&FieldError>> = HashMap::new();
        for error in &self.errors {
            map.entry(error.field.clone()).or_default().push(error);
        }
        map
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = std::result::Result<T, ValidationErrors>;

/// Anything fields can be read from
pub trait FieldSource {
    /// Raw text of a field, `None` when absent
    fn field(&self, location: Location, name: &str) -> Option<String>;
}

impl FieldSource for HashMap<String, String> {
    fn field(&self, _location: Location, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// One step of a field chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Present and non-empty, else fail with the message
    NotEmpty(String),
    /// Strip surrounding whitespace
    Trim,
    /// Replace HTML-significant characters with entities
    Escape,
    /// Integer literal that fits in i64, else fail with the message
    IsInt(String),
    /// ASCII letters only, else fail with the message
    IsAlpha(String),
}

/// Ordered checks for a single field
#[derive(Debug, Clone)]
pub struct FieldChain {
    field: String,
    location: Location,
    steps: Vec<Step>,
}

impl FieldChain {
    /// Chain over a body field
    pub fn body(field: impl Into<String>) -> Self {
        Self::new(field, Location::Body)
    }

    /// Chain over a query-string field
    pub fn query(field: impl Into<String>) -> Self {
        Self::new(field, Location::Query)
    }

    fn new(field: impl Into<String>, location: Location) -> Self {
        Self {
            field: field.into(),
            location,
            steps: Vec::new(),
        }
    }

    /// Require a non-empty value
    #[must_use]
    pub fn not_empty(mut self, message: impl Into<String>) -> Self {
        self.steps.push(Step::NotEmpty(message.into()));
        self
    }

    /// Trim surrounding whitespace
    #[must_use]
    pub fn trim(mut self) -> Self {
        self.steps.push(Step::Trim);
        self
    }

    /// Escape HTML-significant characters
    #[must_use]
    pub fn escape(mut self) -> Self {
        self.steps.push(Step::Escape);
        self
    }

    /// Require an integer
    #[must_use]
    pub fn is_int(mut self, message: impl Into<String>) -> Self {
        self.steps.push(Step::IsInt(message.into()));
        self
    }

    /// Require ASCII letters only
    #[must_use]
    pub fn is_alpha(mut self, message: impl Into<String>) -> Self {
        self.steps.push(Step::IsAlpha(message.into()));
        self
    }

    /// Field name this chain checks
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Lookup location of the field
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Declared type, taken from the type predicate if any
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.steps
            .iter()
            .find_map(|step| match step {
                Step::IsInt(_) => Some(FieldType::Int),
                Step::IsAlpha(_) => Some(FieldType::Alpha),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Whether the chain rejects a missing value
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, Step::NotEmpty(_)))
    }

    /// Run the chain against a source
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step.
    pub fn run(&self, source: &dyn FieldSource) -> Result<Option<FieldValue>, FieldError> {
        let mut value = source.field(self.location, &self.field);

        for step in &self.steps {
            match step {
                Step::NotEmpty(message) => {
                    if value.as_deref().map_or(true, str::is_empty) {
                        return Err(self.fail(message, ValidationCode::Required));
                    }
                }
                Step::Trim => value = value.map(|v| v.trim().to_string()),
                Step::Escape => value = value.map(|v| escape(&v)),
                Step::IsInt(message) => {
                    if !value.as_deref().is_some_and(is_int_literal) {
                        return Err(self.fail(message, ValidationCode::InvalidType));
                    }
                }
                Step::IsAlpha(message) => {
                    if !value.as_deref().is_some_and(is_alpha) {
                        return Err(self.fail(message, ValidationCode::InvalidType));
                    }
                }
            }
        }

        let Some(raw) = value else {
            return Ok(None);
        };
        // is_int_literal passes 20-digit literals that do not fit in i64
        convert_field(&raw, self.field_type())
            .map(Some)
            .map_err(|_| {
                let message = format!("{} must be integer", self.field);
                self.fail(&message, ValidationCode::InvalidType)
            })
    }

    fn fail(&self, message: &str, code: ValidationCode) -> FieldError {
        FieldError::new(&self.field, message, code).at(self.location)
    }
}

/// Escape `& < > " ' / \ `` as HTML entities
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sanitized, typed values produced by a successful validation
#[derive(Debug, Clone, Default)]
pub struct ValidatedFields {
    values: HashMap<(Location, String), FieldValue>,
}

impl ValidatedFields {
    /// Typed value of a field
    #[must_use]
    pub fn get(&self, location: Location, name: &str) -> Option<&FieldValue> {
        self.values.get(&(location, name.to_string()))
    }

    /// Integer value of a field
    #[must_use]
    pub fn int(&self, location: Location, name: &str) -> Option<i64> {
        self.get(location, name).and_then(FieldValue::as_int)
    }

    /// Text value of a field
    #[must_use]
    pub fn text(&self, location: Location, name: &str) -> Option<&str> {
        self.get(location, name).and_then(FieldValue::as_text)
    }

    /// Number of validated fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field was validated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered set of field chains for one route
#[derive(Debug, Clone, Default)]
pub struct Validator {
    chains: Vec<FieldChain>,
}

impl Validator {
    /// Create an empty validator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field chain
    #[must_use]
    pub fn check(mut self, chain: FieldChain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Declared chains, in order
    #[must_use]
    pub fn chains(&self) -> &[FieldChain] {
        &self.chains
    }

    /// Run every chain against the source
    ///
    /// # Errors
    ///
    /// Returns all field errors when at least one chain fails.
    pub fn validate(&self, source: &dyn FieldSource) -> ValidationResult<ValidatedFields> {
        let mut errors = ValidationErrors::new();
        let mut fields = ValidatedFields::default();

        for chain in &self.chains {
            match chain.run(source) {
                Ok(Some(value)) => {
                    fields
                        .values
                        .insert((chain.location, chain.field.clone()), value);
                }
                Ok(None) => {}
                Err(error) => errors.add(error),
            }
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn id_chain() -> FieldChain {
        FieldChain::body("ITEM_ID")
            .not_empty("ITEM_ID must not be empty")
            .trim()
            .escape()
            .is_int("ITEM_ID must be integer")
    }

    #[test]
    fn test_field_error_required() {
        let error = FieldError::required("email");
        assert_eq!(error.field, "email");
        assert_eq!(error.code, ValidationCode::Required);
        assert!(error.message.contains("required"));
    }

    #[test]
    fn test_validation_errors_json() {
        let mut errors = ValidationErrors::new();
        errors.add(FieldError::required("ITEM_ID").at(Location::Query));

        let json = errors.to_json();
        assert!(json.starts_with(r#"{"errors":["#));
        assert!(json.contains("ITEM_ID"));
        assert!(json.contains("REQUIRED"));
        assert!(json.contains(r#""location":"query""#));
    }

    #[test]
    fn test_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add(FieldError::required("ITEM_ID"));
        errors.add(FieldError::new(
            "ITEM_ID",
            "ITEM_ID must be integer",
            ValidationCode::InvalidType,
        ));
        errors.add_required("ITEM_NAME");

        let grouped = errors.by_field();
        assert_eq!(grouped.get("ITEM_ID").map(Vec::len), Some(2));
        assert_eq!(grouped.get("ITEM_NAME").map(Vec::len), Some(1));
    }

    #[test]
    fn test_chain_trims_before_type_check() {
        let value = id_chain().run(&source(&[("ITEM_ID", "  12 ")])).unwrap();
        assert_eq!(value, Some(FieldValue::Int(12)));
    }

    #[test]
    fn test_chain_missing_value_stops_at_not_empty() {
        let err = id_chain().run(&source(&[])).unwrap_err();
        assert_eq!(err.code, ValidationCode::Required);
        assert_eq!(err.message, "ITEM_ID must not be empty");
        assert_eq!(err.location, Some(Location::Body));
    }

    #[test]
    fn test_chain_whitespace_only_fails_type_check() {
        let err = id_chain().run(&source(&[("ITEM_ID", "   ")])).unwrap_err();
        assert_eq!(err.code, ValidationCode::InvalidType);
    }

    #[test]
    fn test_chain_overflowing_int_is_rejected() {
        let err = id_chain()
            .run(&source(&[("ITEM_ID", "99999999999999999999")]))
            .unwrap_err();
        assert_eq!(err.message, "ITEM_ID must be integer");
    }

    #[test]
    fn test_alpha_chain() {
        let chain = FieldChain::body("ITEM_NAME")
            .not_empty("ITEM_NAME must not be empty")
            .trim()
            .escape()
            .is_alpha("ITEM_NAME must be string");
        assert_eq!(chain.field_type(), FieldType::Alpha);

        let err = chain.run(&source(&[("ITEM_NAME", "Tostitos1")])).unwrap_err();
        assert_eq!(err.message, "ITEM_NAME must be string");

        let ok = chain.run(&source(&[("ITEM_NAME", "Tostitos")])).unwrap();
        assert_eq!(ok, Some(FieldValue::Text("Tostitos".to_string())));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'/"), "a&lt;b&gt;&amp;&quot;c&#x27;&#x2F;");
        assert_eq!(escape("Pcs"), "Pcs");
    }

    #[test]
    fn test_validator_collects_every_failing_field() {
        let validator = Validator::new()
            .check(id_chain())
            .check(FieldChain::body("COMPANY_ID").not_empty("COMPANY_ID must not be empty"));

        let errors = validator.validate(&source(&[("ITEM_ID", "x")])).unwrap_err();
        assert_eq!(errors.len(), 2);
        let grouped = errors.by_field();
        assert!(grouped.contains_key("ITEM_ID"));
        assert!(grouped.contains_key("COMPANY_ID"));
    }

    #[test]
    fn test_validator_success_yields_typed_fields() {
        let validator = Validator::new()
            .check(id_chain())
            .check(
                FieldChain::body("ITEM_UNIT")
                    .not_empty("ITEM_UNIT must not be empty")
                    .trim()
                    .escape(),
            );

        let fields = validator
            .validate(&source(&[("ITEM_ID", "3"), ("ITEM_UNIT", " a/b ")]))
            .unwrap();
        assert_eq!(fields.int(Location::Body, "ITEM_ID"), Some(3));
        assert_eq!(fields.text(Location::Body, "ITEM_UNIT"), Some("a&#x2F;b"));
        assert_eq!(fields.int(Location::Query, "ITEM_ID"), None);
    }
}
