//! # Route Handlers
//!
//! Every handler is built from the pool it runs against (and, for writes,
//! the validator guarding it), then registered with the server by `app`.

pub mod foods;
pub mod listing;

use crate::models::WriteReply;
use pantry_core::{Error, Response, ValidationErrors};
use tracing::warn;

/// 422 with the collected field errors
fn unprocessable(errors: &ValidationErrors) -> Response {
    Response::json(errors.to_json()).with_status(422)
}

/// 400 carrying the driver's error text
fn database_failure(route: &str, err: &Error) -> Response {
    warn!(route, error = %err, "Database statement failed");
    Response::json_value(400, &WriteReply::db_error(err))
}
