//! # Pantry API
//!
//! CRUD REST service over the `agents`, `company` and `foods` tables,
//! built on `pantry-core`.
//!
//! ## Routes
//!
//! - `GET /agents`, `GET /company`, `GET /foods` - full listings
//! - `POST /foods` - add a food item
//! - `DELETE /foods?ITEM_ID=` - delete by key
//! - `PUT /foods?ITEM_ID=` - replace a row
//! - `PATCH /foods/updateItemName?ITEM_ID=&ITEM_NAME=` - rename
//! - `GET /docs` - Swagger UI over `/docs/openapi.json`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod app;
pub mod config;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod rules;
pub mod telemetry;

pub use app::build_server;
pub use config::AppConfig;
