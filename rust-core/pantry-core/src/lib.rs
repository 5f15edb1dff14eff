//! # Pantry Core
//!
//! Runtime library behind the Pantry REST API.
//! Provides the HTTP server, routing, request validation, pooled SQL access
//! and OpenAPI document generation.
//!
//! ## Architecture
//!
//! Tokio drives everything: one task per connection, handlers are async
//! closures, and database work is awaited on pooled SQLx connections.
//! Shared resources (the pool) reach handlers through captured `Arc` state.
//!
//! ## Modules
//!
//! - `server` - HTTP server built on Hyper
//! - `router` - Routing using matchit (radix trie)
//! - `route` - Route metadata and information
//! - `request` - HTTP request wrapper with headers, query and body fields
//! - `middleware` - Request/response middleware system
//! - `json` - JSON parsing with simd-json
//! - `validation` - Field validator chains and structured validation errors
//! - `openapi` - OpenAPI document and Swagger UI
//! - `database` - SQLx connection pool and query execution (MySQL, SQLite)
//! - `types` - Field types and conversion
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod database;
pub mod error;
pub mod json;
pub mod middleware;
pub mod openapi;
pub mod request;
pub mod route;
pub mod router;
pub mod server;
pub mod types;
pub mod validation;

pub use database::{DatabasePool, DbRow, DbValue};
pub use error::{Error, Result};
pub use middleware::{
    CorsMiddleware, LoggingMiddleware, Middleware, MiddlewareChain, TimingMiddleware,
};
pub use openapi::{ApiDoc, Info, RouteDoc};
pub use request::Request;
pub use route::RouteInfo;
pub use router::{Method, Router};
pub use server::{handler, Handler, Response, Server, ServerConfig};
pub use types::{FieldType, FieldValue};
pub use validation::{
    FieldChain, FieldError, Location, ValidatedFields, ValidationCode, ValidationErrors,
    ValidationResult, Validator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
