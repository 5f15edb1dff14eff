//! # Route Metadata
//!
//! Information kept about each registered route: where it lives, which
//! handler serves it, and the documentation annotation it was declared with.

use crate::openapi::RouteDoc;
use crate::router::{HandlerId, Method};

/// Route metadata containing handler and documentation information
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// Unique handler identifier
    pub handler_id: HandlerId,
    /// HTTP method
    pub method: Method,
    /// Path pattern as registered (e.g., "/foods/updateItemName")
    pub path_pattern: String,
    /// Documentation annotation, if the route has one
    pub doc: Option<RouteDoc>,
}

impl RouteInfo {
    /// Create a new RouteInfo
    #[must_use]
    pub fn new(handler_id: HandlerId, method: Method, path: &str, doc: Option<RouteDoc>) -> Self {
        Self {
            handler_id,
            method,
            path_pattern: normalize_path(path),
            doc,
        }
    }

    /// Whether the route is annotated for the API document
    #[must_use]
    pub const fn is_documented(&self) -> bool {
        self.doc.is_some()
    }
}

/// Collapse duplicate and trailing slashes: "//foods/" -> "/foods"
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
