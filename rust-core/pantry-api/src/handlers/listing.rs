//! `GET /agents`, `GET /company`, `GET /foods`.

use super::database_failure;
use crate::models::Table;
use pantry_core::{handler, DatabasePool, Handler, Request, Response};
use std::sync::Arc;

/// Every row of `table`, columns in table order
pub fn list(pool: Arc<DatabasePool>, table: Table) -> Handler {
    handler(move |_req: Request| {
        let pool = pool.clone();
        async move {
            match pool.fetch_all(table.select_all(), &[]).await {
                Ok(rows) => Response::json_value(200, &rows),
                Err(e) => database_failure(table.name(), &e),
            }
        }
    })
}
