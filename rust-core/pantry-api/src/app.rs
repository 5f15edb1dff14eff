//! # Application Wiring
//!
//! Builds the [`Server`]: middleware, the seven service routes with their
//! validators and documentation, and the docs endpoints. The pool is shared
//! by every handler.

use crate::config::AppConfig;
use crate::handlers::{foods, listing};
use crate::models::Table;
use crate::{docs, rules};
use pantry_core::{
    ApiDoc, CorsMiddleware, DatabasePool, LoggingMiddleware, Method, Result, Server,
    TimingMiddleware,
};
use std::sync::Arc;
use tracing::info;

/// Where the Swagger UI is served
pub const DOCS_PATH: &str = "/docs";

/// Build the fully routed server
///
/// # Errors
///
/// Returns an error if a route cannot be registered or the API document
/// cannot be serialized
pub fn build_server(pool: Arc<DatabasePool>, config: &AppConfig) -> Result<Server> {
    let mut server = Server::new().bind(config.address);
    server.set_max_body_size(config.max_body_size);

    server.add_middleware(LoggingMiddleware::new());
    server.add_middleware(TimingMiddleware::new());
    server.add_middleware(CorsMiddleware::new().allow_origin(config.cors_origin.as_str()));

    for (path, table) in [
        ("/agents", Table::Agents),
        ("/company", Table::Company),
        ("/foods", Table::Foods),
    ] {
        server.add_route(
            Method::Get,
            path,
            listing::list(pool.clone(), table),
            Some(docs::listing(table)),
        )?;
    }

    let post = rules::post_food();
    server.add_route(
        Method::Post,
        "/foods",
        foods::create(pool.clone(), post.clone()),
        Some(docs::create_food(&post)),
    )?;

    let delete = rules::delete_food();
    server.add_route(
        Method::Delete,
        "/foods",
        foods::delete(pool.clone(), delete.clone()),
        Some(docs::delete_food(&delete)),
    )?;

    let put = rules::put_food();
    server.add_route(
        Method::Put,
        "/foods",
        foods::replace(pool.clone(), put.clone()),
        Some(docs::replace_food(&put)),
    )?;

    let patch = rules::patch_item_name();
    server.add_route(
        Method::Patch,
        "/foods/updateItemName",
        foods::rename(pool, patch.clone()),
        Some(docs::rename_food(&patch)),
    )?;

    server.mount_docs(
        &ApiDoc::new(docs::info(&config.docs_title)),
        DOCS_PATH,
        &config.docs_title,
    )?;

    info!(docs = DOCS_PATH, "Routes registered");
    Ok(server)
}
