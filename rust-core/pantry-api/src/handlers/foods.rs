//! Write handlers for the `foods` table.
//!
//! Each one validates first and only touches the database when every field
//! passes. A statement that matches no row answers 200 with a `failed` body.

use super::{database_failure, unprocessable};
use crate::models::{FoodItem, WriteReply};
use pantry_core::{
    handler, DatabasePool, DbValue, Handler, Location, Request, Response, ValidatedFields,
    ValidationErrors, Validator,
};
use std::sync::Arc;

const INSERT_FOOD: &str =
    "INSERT INTO foods (ITEM_ID, ITEM_NAME, ITEM_UNIT, COMPANY_ID) VALUES (?, ?, ?, ?)";
const DELETE_FOOD: &str = "DELETE FROM foods WHERE ITEM_ID = ?";
const REPLACE_FOOD: &str =
    "UPDATE foods SET ITEM_ID = ?, ITEM_NAME = ?, ITEM_UNIT = ?, COMPANY_ID = ? WHERE ITEM_ID = ?";
const RENAME_FOOD: &str = "UPDATE foods SET ITEM_NAME = ? WHERE ITEM_ID = ?";

fn query_key(fields: &ValidatedFields) -> Result<i64, ValidationErrors> {
    fields.int(Location::Query, "ITEM_ID").ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add_required("ITEM_ID");
        errors
    })
}

/// Run a keyed statement; zero affected rows means the key does not exist
async fn keyed_write(
    pool: &DatabasePool,
    route: &str,
    sql: &str,
    params: &[DbValue],
    item_id: i64,
    message: &str,
) -> Response {
    match pool.execute(sql, params).await {
        Ok(0) => Response::json_value(200, &WriteReply::not_found(item_id)),
        Ok(n) => Response::json_value(200, &WriteReply::success(message, n)),
        Err(e) => database_failure(route, &e),
    }
}

/// `POST /foods`
pub fn create(pool: Arc<DatabasePool>, rules: Validator) -> Handler {
    let rules = Arc::new(rules);
    handler(move |req: Request| {
        let pool = pool.clone();
        let rules = rules.clone();
        async move {
            let item = match rules
                .validate(&req)
                .and_then(|fields| FoodItem::from_fields(&fields))
            {
                Ok(item) => item,
                Err(errors) => return unprocessable(&errors),
            };

            match pool.execute(INSERT_FOOD, &item.params()).await {
                Ok(n) => {
                    let reply = WriteReply::success("Food item added successfully", n);
                    Response::json_value(200, &reply)
                }
                Err(e) => database_failure("POST /foods", &e),
            }
        }
    })
}

/// `DELETE /foods?ITEM_ID=`
pub fn delete(pool: Arc<DatabasePool>, rules: Validator) -> Handler {
    let rules = Arc::new(rules);
    handler(move |req: Request| {
        let pool = pool.clone();
        let rules = rules.clone();
        async move {
            let item_id = match rules.validate(&req).and_then(|fields| query_key(&fields)) {
                Ok(id) => id,
                Err(errors) => return unprocessable(&errors),
            };

            keyed_write(
                &pool,
                "DELETE /foods",
                DELETE_FOOD,
                &[item_id.into()],
                item_id,
                "Food item deleted successfully",
            )
            .await
        }
    })
}

/// `PUT /foods?ITEM_ID=`, replacing every column of the keyed row
pub fn replace(pool: Arc<DatabasePool>, rules: Validator) -> Handler {
    let rules = Arc::new(rules);
    handler(move |req: Request| {
        let pool = pool.clone();
        let rules = rules.clone();
        async move {
            let (item, target) = match rules.validate(&req).and_then(|fields| {
                Ok((FoodItem::from_fields(&fields)?, query_key(&fields)?))
            }) {
                Ok(parts) => parts,
                Err(errors) => return unprocessable(&errors),
            };

            let mut params = item.params();
            params.push(target.into());
            keyed_write(
                &pool,
                "PUT /foods",
                REPLACE_FOOD,
                &params,
                target,
                "Food item updated successfully",
            )
            .await
        }
    })
}

/// `PATCH /foods/updateItemName?ITEM_ID=&ITEM_NAME=`
pub fn rename(pool: Arc<DatabasePool>, rules: Validator) -> Handler {
    let rules = Arc::new(rules);
    handler(move |req: Request| {
        let pool = pool.clone();
        let rules = rules.clone();
        async move {
            let (item_id, name) = match rules.validate(&req).and_then(|fields| {
                let item_id = query_key(&fields)?;
                let name = fields
                    .text(Location::Query, "ITEM_NAME")
                    .map(str::to_string)
                    .ok_or_else(|| {
                        let mut errors = ValidationErrors::new();
                        errors.add_required("ITEM_NAME");
                        errors
                    })?;
                Ok((item_id, name))
            }) {
                Ok(parts) => parts,
                Err(errors) => return unprocessable(&errors),
            };

            keyed_write(
                &pool,
                "PATCH /foods/updateItemName",
                RENAME_FOOD,
                &[name.into(), item_id.into()],
                item_id,
                "Food item name updated successfully",
            )
            .await
        }
    })
}
