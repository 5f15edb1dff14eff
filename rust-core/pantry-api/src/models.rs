//! Tables, the food item payload and write reply bodies.

use pantry_core::{DbValue, Location, ValidatedFields, ValidationErrors};
use serde::Serialize;

/// Read-only listing targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// `agents`
    Agents,
    /// `company`
    Company,
    /// `foods`
    Foods,
}

impl Table {
    /// SQL table name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::Company => "company",
            Self::Foods => "foods",
        }
    }

    /// Statement listing every row
    #[must_use]
    pub const fn select_all(self) -> &'static str {
        match self {
            Self::Agents => "SELECT * FROM agents",
            Self::Company => "SELECT * FROM company",
            Self::Foods => "SELECT * FROM foods",
        }
    }
}

/// A row of the `foods` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FoodItem {
    /// Item key
    pub item_id: i64,
    /// Alphabetic item name
    pub item_name: String,
    /// Unit of sale, e.g. `Pcs`
    pub item_unit: String,
    /// Owning company
    pub company_id: i64,
}

impl FoodItem {
    /// Build from validated body fields
    ///
    /// # Errors
    ///
    /// Returns a required-field error for every column that is missing
    pub fn from_fields(fields: &ValidatedFields) -> Result<Self, ValidationErrors> {
        let item_id = fields.int(Location::Body, "ITEM_ID");
        let item_name = fields.text(Location::Body, "ITEM_NAME");
        let item_unit = fields.text(Location::Body, "ITEM_UNIT");
        let company_id = fields.int(Location::Body, "COMPANY_ID");

        match (item_id, item_name, item_unit, company_id) {
            (Some(item_id), Some(item_name), Some(item_unit), Some(company_id)) => Ok(Self {
                item_id,
                item_name: item_name.to_string(),
                item_unit: item_unit.to_string(),
                company_id,
            }),
            _ => {
                let mut errors = ValidationErrors::new();
                for (name, present) in [
                    ("ITEM_ID", item_id.is_some()),
                    ("ITEM_NAME", item_name.is_some()),
                    ("ITEM_UNIT", item_unit.is_some()),
                    ("COMPANY_ID", company_id.is_some()),
                ] {
                    if !present {
                        errors.add_required(name);
                    }
                }
                Err(errors)
            }
        }
    }

    /// Column values in `ITEM_ID, ITEM_NAME, ITEM_UNIT, COMPANY_ID` order
    #[must_use]
    pub fn params(&self) -> Vec<DbValue> {
        vec![
            self.item_id.into(),
            self.item_name.as_str().into(),
            self.item_unit.as_str().into(),
            self.company_id.into(),
        ]
    }
}

/// Body of a write response, or of a failed listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReply {
    /// `success` or `failed`
    pub status: &'static str,
    /// Human readable outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Rows touched by the statement
    #[serde(rename = "affectedRows", skip_serializing_if = "Option::is_none")]
    pub affected_rows: Option<u64>,
    /// Driver error text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WriteReply {
    /// The statement touched `affected_rows` rows
    pub fn success(message: impl Into<String>, affected_rows: u64) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            affected_rows: Some(affected_rows),
            error: None,
        }
    }

    /// No food item has this key
    #[must_use]
    pub fn not_found(item_id: i64) -> Self {
        Self {
            status: "failed",
            message: Some(format!("No Food object with ID {item_id}")),
            affected_rows: None,
            error: None,
        }
    }

    /// The database rejected the statement
    pub fn db_error(error: &impl ToString) -> Self {
        Self {
            status: "failed",
            message: None,
            affected_rows: None,
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{FieldChain, Validator};
    use std::collections::HashMap;

    #[test]
    fn test_food_item_wire_names() {
        let item = FoodItem {
            item_id: 1,
            item_name: "Tostitos".to_string(),
            item_unit: "Pcs".to_string(),
            company_id: 1,
        };
        assert_eq!(
            serde_json::to_string(&item).unwrap(),
            r#"{"ITEM_ID":1,"ITEM_NAME":"Tostitos","ITEM_UNIT":"Pcs","COMPANY_ID":1}"#
        );
        assert_eq!(item.params()[1], DbValue::String("Tostitos".to_string()));
    }

    #[test]
    fn test_food_item_reports_missing_columns() {
        let validator = Validator::new().check(FieldChain::body("ITEM_ID").is_int("bad"));
        let source = HashMap::from([("ITEM_ID".to_string(), "3".to_string())]);
        let fields = validator.validate(&source).unwrap();

        let errors = FoodItem::from_fields(&fields).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.by_field().contains_key("COMPANY_ID"));
    }

    #[test]
    fn test_reply_bodies() {
        assert_eq!(
            serde_json::to_string(&WriteReply::success("Food item deleted", 1)).unwrap(),
            r#"{"status":"success","message":"Food item deleted","affectedRows":1}"#
        );
        assert_eq!(
            serde_json::to_string(&WriteReply::not_found(7)).unwrap(),
            r#"{"status":"failed","message":"No Food object with ID 7"}"#
        );
        assert_eq!(
            serde_json::to_string(&WriteReply::db_error(&"Duplicate entry")).unwrap(),
            r#"{"status":"failed","error":"Duplicate entry"}"#
        );
    }

    #[test]
    fn test_table_statements() {
        assert_eq!(Table::Company.name(), "company");
        assert_eq!(Table::Foods.select_all(), "SELECT * FROM foods");
    }
}
