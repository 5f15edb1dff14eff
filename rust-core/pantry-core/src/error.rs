//! # Error Handling
//!
//! One error enum for the whole runtime, built with `thiserror`.
//! Driver failures keep the driver's own text so handlers can hand it back
//! to clients unchanged.

use thiserror::Error;

/// Result type alias for Pantry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the Pantry runtime
#[derive(Error, Debug)]
pub enum Error {
    /// The listener could not be set up
    #[error("cannot listen on {address}: {source}")]
    BindError {
        /// Requested listen address
        address: String,
        /// Socket error
        #[source]
        source: std::io::Error,
    },

    /// No route serves this path for the request method
    #[error("no route for {path}")]
    RouteNotFound {
        /// Requested path
        path: String,
    },

    /// Request method has no routes at all (e.g. `TRACE`)
    #[error("unsupported method {method}")]
    UnsupportedMethod {
        /// Method as sent
        method: String,
    },

    /// A route could not be registered
    #[error("cannot register route {pattern}: {reason}")]
    InvalidRoutePattern {
        /// Offending pattern
        pattern: String,
        /// Router's explanation
        reason: String,
    },

    /// Hyper failure while reading a request
    #[error("http: {0}")]
    Http(#[from] hyper::Error),

    /// JSON encoding failure
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Request body could not be decoded
    #[error("malformed body: {reason}")]
    MalformedBody {
        /// Decoder message
        reason: String,
    },

    /// Database failure; displays as the driver's message alone
    #[error("{message}")]
    Database {
        /// Driver message
        message: String,
    },

    /// Bad configuration value
    #[error("configuration: {message}")]
    Config {
        /// What was rejected
        message: String,
    },

    /// Request body over the configured limit
    #[error("request body of {actual} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge {
        /// Configured limit
        limit: usize,
        /// Bytes received or declared
        actual: usize,
    },
}

impl Error {
    /// HTTP status a client should see for this error
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::RouteNotFound { .. } | Self::UnsupportedMethod { .. } => 404,
            Self::PayloadTooLarge { .. } => 413,
            Self::MalformedBody { .. } | Self::Http(_) | Self::Database { .. } => 400,
            _ => 500,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }
}
