//! Documentation annotations for the service routes.

use crate::models::Table;
use pantry_core::{Info, RouteDoc, Validator};

/// Version reported in the API document
pub const API_VERSION: &str = "1.0.0";

/// Document metadata
pub fn info(title: &str) -> Info {
    Info::new(title, API_VERSION).description("CRUD API over the agents, company and foods tables")
}

/// `GET` listing of `table`
#[must_use]
pub fn listing(table: Table) -> RouteDoc {
    RouteDoc::new(format!("List {}", table.name()))
        .description(format!("Every row of the {} table, in table column order", table.name()))
        .tag(table.name())
        .response(200, "Array of rows")
        .response(400, "Database error")
}

fn with_food_examples(doc: RouteDoc) -> RouteDoc {
    doc.example("ITEM_ID", 1)
        .example("ITEM_NAME", "Tostitos")
        .example("ITEM_UNIT", "Pcs")
        .example("COMPANY_ID", 1)
}

fn write_responses(doc: RouteDoc) -> RouteDoc {
    doc.response(200, "Success, or no food item with that ID")
        .response(422, "Validation failed")
        .response(400, "Database error")
}

/// `POST /foods`
#[must_use]
pub fn create_food(rules: &Validator) -> RouteDoc {
    write_responses(with_food_examples(
        RouteDoc::new("Add a food item").tag("foods").fields_from(rules),
    ))
}

/// `DELETE /foods`
#[must_use]
pub fn delete_food(rules: &Validator) -> RouteDoc {
    write_responses(with_food_examples(
        RouteDoc::new("Delete a food item by ID").tag("foods").fields_from(rules),
    ))
}

/// `PUT /foods`
#[must_use]
pub fn replace_food(rules: &Validator) -> RouteDoc {
    write_responses(with_food_examples(
        RouteDoc::new("Replace a food item")
            .description("Overwrites every column of the row whose ITEM_ID is given in the query")
            .tag("foods")
            .fields_from(rules),
    ))
}

/// `PATCH /foods/updateItemName`
#[must_use]
pub fn rename_food(rules: &Validator) -> RouteDoc {
    write_responses(with_food_examples(
        RouteDoc::new("Rename a food item").tag("foods").fields_from(rules),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;

    #[test]
    fn test_food_docs_carry_examples() {
        let doc = create_food(&rules::post_food());
        let name = doc.fields().iter().find(|f| f.name == "ITEM_NAME").unwrap();
        assert_eq!(name.example, Some(serde_json::json!("Tostitos")));
        assert_eq!(doc.fields().len(), 4);
    }

    #[test]
    fn test_put_doc_lists_query_key() {
        let doc = replace_food(&rules::put_food());
        assert_eq!(doc.fields().iter().filter(|f| f.name == "ITEM_ID").count(), 2);
    }
}
