//! Field validators for the write routes.

use pantry_core::{FieldChain, Validator};

fn integer(chain: FieldChain) -> FieldChain {
    let name = chain.field().to_string();
    chain
        .not_empty(format!("{name} must not be empty"))
        .trim()
        .escape()
        .is_int(format!("{name} must be integer"))
}

fn alphabetic(chain: FieldChain) -> FieldChain {
    let name = chain.field().to_string();
    chain
        .not_empty(format!("{name} must not be empty"))
        .trim()
        .escape()
        .is_alpha(format!("{name} must be string"))
}

fn text(chain: FieldChain) -> FieldChain {
    let name = chain.field().to_string();
    chain
        .not_empty(format!("{name} must not be empty"))
        .trim()
        .escape()
}

/// `POST /foods`: the four columns in the body
#[must_use]
pub fn post_food() -> Validator {
    Validator::new()
        .check(integer(FieldChain::body("ITEM_ID")))
        .check(alphabetic(FieldChain::body("ITEM_NAME")))
        .check(text(FieldChain::body("ITEM_UNIT")))
        .check(integer(FieldChain::body("COMPANY_ID")))
}

/// `DELETE /foods`: the key in the query string
#[must_use]
pub fn delete_food() -> Validator {
    Validator::new().check(integer(FieldChain::query("ITEM_ID")))
}

/// `PUT /foods`: the four columns in the body, the target key in the query
#[must_use]
pub fn put_food() -> Validator {
    post_food().check(integer(FieldChain::query("ITEM_ID")))
}

/// `PATCH /foods/updateItemName`: key and new name in the query string
#[must_use]
pub fn patch_item_name() -> Validator {
    Validator::new()
        .check(integer(FieldChain::query("ITEM_ID")))
        .check(alphabetic(FieldChain::query("ITEM_NAME")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{Location, ValidationCode};
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_post_food_accepts_valid_payload() {
        let fields = post_food()
            .validate(&source(&[
                ("ITEM_ID", " 1 "),
                ("ITEM_NAME", "Tostitos"),
                ("ITEM_UNIT", "Pcs"),
                ("COMPANY_ID", "1"),
            ]))
            .unwrap();

        assert_eq!(fields.int(Location::Body, "ITEM_ID"), Some(1));
        assert_eq!(fields.text(Location::Body, "ITEM_UNIT"), Some("Pcs"));
    }

    #[test]
    fn test_post_food_reports_every_bad_field() {
        let errors = post_food()
            .validate(&source(&[
                ("ITEM_ID", "01"),
                ("ITEM_NAME", "Tostitos1"),
                ("ITEM_UNIT", "Pcs"),
            ]))
            .unwrap_err();

        let by_field = errors.by_field();
        assert_eq!(errors.len(), 3);
        assert_eq!(by_field["ITEM_ID"][0].message, "ITEM_ID must be integer");
        assert_eq!(by_field["ITEM_NAME"][0].message, "ITEM_NAME must be string");
        assert_eq!(by_field["COMPANY_ID"][0].message, "COMPANY_ID must not be empty");
        assert_eq!(by_field["COMPANY_ID"][0].code, ValidationCode::Required);
    }

    #[test]
    fn test_unit_is_escaped() {
        let fields = post_food()
            .validate(&source(&[
                ("ITEM_ID", "2"),
                ("ITEM_NAME", "Salsa"),
                ("ITEM_UNIT", "<b>Jar</b>"),
                ("COMPANY_ID", "3"),
            ]))
            .unwrap();
        assert_eq!(
            fields.text(Location::Body, "ITEM_UNIT"),
            Some("&lt;b&gt;Jar&lt;&#x2F;b&gt;")
        );
    }

    #[test]
    fn test_validator_shapes() {
        assert_eq!(delete_food().chains().len(), 1);
        assert_eq!(put_food().chains().len(), 5);
        assert!(patch_item_name()
            .chains()
            .iter()
            .all(|chain| chain.location() == Location::Query));
    }
}
