//! # Router
//!
//! Radix-trie router using `matchit`, one trie per HTTP method.
//!
//! ## Features
//!
//! - Static routes (`/foods`, `/foods/updateItemName`)
//! - Route metadata kept for documentation generation

use crate::error::{Error, Result};
use crate::openapi::RouteDoc;
use crate::route::RouteInfo;
use matchit::Router as MatchitRouter;
use std::collections::HashMap;

/// HTTP methods supported by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
    /// HTTP PATCH
    Patch,
    /// HTTP HEAD
    Head,
    /// HTTP OPTIONS
    Options,
}

impl Method {
    /// Lowercase name, as used for OpenAPI operation keys
    #[must_use]
    pub const fn as_lower(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
            Self::Head => write!(f, "HEAD"),
            Self::Options => write!(f, "OPTIONS"),
        }
    }
}

impl TryFrom<&hyper::Method> for Method {
    type Error = Error;

    /// Methods outside this enum have no routes and are rejected
    fn try_from(method: &hyper::Method) -> Result<Self> {
        Ok(match *method {
            hyper::Method::GET => Self::Get,
            hyper::Method::POST => Self::Post,
            hyper::Method::PUT => Self::Put,
            hyper::Method::DELETE => Self::Delete,
            hyper::Method::PATCH => Self::Patch,
            hyper::Method::HEAD => Self::Head,
            hyper::Method::OPTIONS => Self::Options,
            _ => {
                return Err(Error::UnsupportedMethod {
                    method: method.to_string(),
                })
            }
        })
    }
}

/// Route handler identifier
pub type HandlerId = usize;

/// Matched route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// The handler ID for this route
    pub handler_id: HandlerId,
}

/// Per-method storage for routes
#[derive(Clone)]
struct MethodRoutes {
    router: MatchitRouter<HandlerId>,
}

/// HTTP router using a radix trie per method
#[derive(Clone, Default)]
pub struct Router {
    /// Per-method routers for efficient matching
    method_routes: HashMap<Method, MethodRoutes>,
    /// Route metadata indexed by handler ID
    routes: Vec<RouteInfo>,
}

impl Router {
    /// Create a new empty router
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route with the given method and path pattern
    ///
    /// # Returns
    ///
    /// The handler ID assigned to this route
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoutePattern` if the pattern is malformed or
    /// already registered for this method
    pub fn add_route(
        &mut self,
        method: Method,
        path: &str,
        doc: Option<RouteDoc>,
    ) -> Result<HandlerId> {
        let handler_id = self.routes.len();
        let route_info = RouteInfo::new(handler_id, method, path, doc);

        self.method_routes
            .entry(method)
            .or_insert_with(|| MethodRoutes {
                router: MatchitRouter::new(),
            })
            .router
            .insert(route_info.path_pattern.clone(), handler_id)
            .map_err(|e| Error::InvalidRoutePattern {
                pattern: path.to_string(),
                reason: e.to_string(),
            })?;

        self.routes.push(route_info);
        Ok(handler_id)
    }

    /// Match a request path against registered routes
    ///
    /// # Errors
    ///
    /// Returns `Error::RouteNotFound` if no matching route exists
    pub fn match_route(&self, method: Method, path: &str) -> Result<Match> {
        let not_found = || Error::RouteNotFound {
            path: path.to_string(),
        };

        let matched = self
            .method_routes
            .get(&method)
            .ok_or_else(not_found)?
            .router
            .at(path)
            .map_err(|_| not_found())?;

        Ok(Match {
            handler_id: *matched.value,
        })
    }

    /// Registered routes, in registration order
    #[must_use]
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_routing() {
        let mut router = Router::new();

        let id1 = router.add_route(Method::Get, "/agents", None).unwrap();
        let id2 = router.add_route(Method::Get, "/foods", None).unwrap();
        let id3 = router.add_route(Method::Post, "/foods", None).unwrap();

        assert_eq!((id1, id2, id3), (0, 1, 2));

        let m = router.match_route(Method::Get, "/agents").unwrap();
        assert_eq!(m.handler_id, 0);

        let m = router.match_route(Method::Get, "/foods").unwrap();
        assert_eq!(m.handler_id, 1);

        let m = router.match_route(Method::Post, "/foods").unwrap();
        assert_eq!(m.handler_id, 2);
    }

    #[test]
    fn test_static_child_route() {
        let mut router = Router::new();
        router.add_route(Method::Put, "/foods", None).unwrap();
        router
            .add_route(Method::Patch, "/foods/updateItemName", None)
            .unwrap();

        let m = router
            .match_route(Method::Patch, "/foods/updateItemName")
            .unwrap();
        assert_eq!(m.handler_id, 1);
        assert!(router.match_route(Method::Patch, "/foods").is_err());
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut router = Router::new();
        router.add_route(Method::Get, "/foods", None).unwrap();
        assert!(router.add_route(Method::Get, "/foods", None).is_err());
        assert_eq!(router.routes().len(), 1);
    }

    #[test]
    fn test_route_not_found() {
        let router = Router::new();
        assert!(router.match_route(Method::Get, "/nonexistent").is_err());
    }

    #[test]
    fn test_method_not_allowed() {
        let mut router = Router::new();
        router.add_route(Method::Get, "/agents", None).unwrap();
        assert!(router.match_route(Method::Post, "/agents").is_err());
    }

    #[test]
    fn test_method_from_hyper() {
        assert_eq!(Method::try_from(&hyper::Method::PATCH).unwrap(), Method::Patch);
        assert_eq!(Method::try_from(&hyper::Method::DELETE).unwrap(), Method::Delete);
        assert_eq!(Method::Patch.as_lower(), "patch");
    }

    #[test]
    fn test_unknown_methods_are_not_routable() {
        let trace = Method::try_from(&hyper::Method::TRACE).unwrap_err();
        assert_eq!(trace.status_code(), 404);

        let propfind = hyper::Method::from_bytes(b"PROPFIND").unwrap();
        assert!(matches!(
            Method::try_from(&propfind),
            Err(Error::UnsupportedMethod { method }) if method == "PROPFIND"
        ));
    }
}
