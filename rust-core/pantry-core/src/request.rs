//! # HTTP Request
//!
//! Request wrapper handed to handlers. Query string and body fields are
//! decoded once when the request is built.

use crate::error::{Error, Result};
use crate::json::object_fields;
use crate::router::Method;
use crate::validation::{FieldSource, Location};
use http_body_util::BodyExt;
use hyper::body::Bytes;
use std::collections::HashMap;
use tracing::debug;

/// HTTP Request wrapper
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Request path (without query string)
    pub path: String,
    /// Raw query string (e.g., "ITEM_ID=1&ITEM_NAME=Chips")
    query_string: Option<String>,
    /// Parsed query parameters
    query_params: HashMap<String, String>,
    /// Fields decoded from a JSON object or urlencoded body
    body_fields: HashMap<String, String>,
    /// Request headers
    headers: hyper::HeaderMap,
}

impl Request {
    /// Create a new Request manually (for testing/internal use)
    pub fn new(
        method: Method,
        path: String,
        headers_map: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Self {
        let (path, query_string) = if let Some((p, q)) = path.split_once('?') {
            (p.to_string(), Some(q.to_string()))
        } else {
            (path, None)
        };

        let mut headers = hyper::HeaderMap::new();
        for (k, v) in headers_map {
            if let (Ok(n), Ok(v)) = (
                hyper::header::HeaderName::from_bytes(k.as_bytes()),
                hyper::header::HeaderValue::from_str(&v),
            ) {
                headers.insert(n, v);
            }
        }

        Self::assemble(method, path, query_string, headers, body)
    }

    /// Create from hyper request with body size limit
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadTooLarge` when the declared or received body
    /// exceeds `max_body_size`, `Error::UnsupportedMethod` for a method no
    /// route can serve and `Error::Http` if the body cannot be read.
    pub async fn from_hyper_with_limit(
        req: hyper::Request<hyper::body::Incoming>,
        max_body_size: usize,
    ) -> Result<Self> {
        let method = Method::try_from(req.method())?;

        let uri = req.uri();
        let path = uri.path().to_string();
        let query_string = uri.query().map(String::from);

        let headers = req.headers().clone();
        if let Some(content_len) = headers
            .get(hyper::header::CONTENT_LENGTH)
            .and_then(|len| len.to_str().ok())
            .and_then(|len| len.parse::<usize>().ok())
        {
            if content_len > max_body_size {
                return Err(Error::PayloadTooLarge {
                    limit: max_body_size,
                    actual: content_len,
                });
            }
        }

        let bytes = BodyExt::collect(req.into_body()).await?.to_bytes();
        if bytes.len() > max_body_size {
            return Err(Error::PayloadTooLarge {
                limit: max_body_size,
                actual: bytes.len(),
            });
        }

        Ok(Self::assemble(method, path, query_string, headers, Some(bytes)))
    }

    fn assemble(
        method: Method,
        path: String,
        query_string: Option<String>,
        headers: hyper::HeaderMap,
        body: Option<Bytes>,
    ) -> Self {
        let query_params = parse_query_string(query_string.as_deref());
        let content_type = headers
            .get(hyper::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let body_fields = decode_body_fields(content_type, body.as_deref());

        Self {
            method,
            path,
            query_string,
            query_params,
            body_fields,
            headers,
        }
    }

    /// Get a header value by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set or override a header
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let (Ok(n), Ok(v)) = (
            hyper::header::HeaderName::from_bytes(name.as_bytes()),
            hyper::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(n, v);
        }
    }

    /// Get query parameters as a HashMap
    #[must_use]
    pub fn query_map(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Get raw query string
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Get decoded body fields
    #[must_use]
    pub fn body_fields(&self) -> &HashMap<String, String> {
        &self.body_fields
    }
}

impl FieldSource for Request {
    fn field(&self, location: Location, name: &str) -> Option<String> {
        match location {
            Location::Body => self.body_fields.get(name).cloned(),
            Location::Query => self.query_params.get(name).cloned(),
        }
    }
}

/// Decode body fields from a JSON object or a urlencoded form
///
/// Anything else, including a body that fails to parse, yields no fields.
fn decode_body_fields(
    content_type: Option<&str>,
    body: Option<&[u8]>,
) -> HashMap<String, String> {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return HashMap::new();
    };
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("application/x-www-form-urlencoded") => {
            parse_query_string(std::str::from_utf8(body).ok())
        }
        _ => match object_fields(body) {
            Ok(fields) => fields,
            Err(e) => {
                debug!(error = %e, "Ignoring undecodable request body");
                HashMap::new()
            }
        },
    }
}

/// Parse query string into HashMap
///
/// Handles URL decoding and duplicate keys (last value wins).
fn parse_query_string(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| {
            q.split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| {
                    let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                    (url_decode(key), url_decode(value))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// URL decoding of `+` and `%XX` escapes, UTF-8 aware
fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let decoded = bytes
                    .get(i + 1..i + 3)
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 2;
                } else {
                    out.push(b'%');
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_headers() -> HashMap<String, String> {
        HashMap::from([("content-type".to_string(), "application/json".to_string())])
    }

    #[test]
    fn test_parse_query_string_simple() {
        let result = parse_query_string(Some("ITEM_ID=1&ITEM_NAME=Chips"));
        assert_eq!(result.get("ITEM_ID"), Some(&"1".to_string()));
        assert_eq!(result.get("ITEM_NAME"), Some(&"Chips".to_string()));
    }

    #[test]
    fn test_parse_query_string_empty() {
        assert!(parse_query_string(None).is_empty());
        assert!(parse_query_string(Some("")).is_empty());
    }

    #[test]
    fn test_parse_query_string_url_encoded() {
        let result = parse_query_string(Some("name=John+Doe&city=New%20York"));
        assert_eq!(result.get("name"), Some(&"John Doe".to_string()));
        assert_eq!(result.get("city"), Some(&"New York".to_string()));
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("hello+world"), "hello world");
        assert_eq!(url_decode("100%25"), "100%");
        assert_eq!(url_decode("caf%C3%A9"), "café");
        assert_eq!(url_decode("50%"), "50%");
    }

    #[test]
    fn test_request_splits_query() {
        let req = Request::new(
            Method::Delete,
            "/foods?ITEM_ID=4".to_string(),
            HashMap::new(),
            None,
        );
        assert_eq!(req.path, "/foods");
        assert_eq!(req.query_string(), Some("ITEM_ID=4"));
        assert_eq!(req.field(Location::Query, "ITEM_ID"), Some("4".to_string()));
        assert_eq!(req.field(Location::Body, "ITEM_ID"), None);
    }

    #[test]
    fn test_json_body_fields() {
        let req = Request::new(
            Method::Post,
            "/foods".to_string(),
            json_headers(),
            Some(Bytes::from_static(br#"{"ITEM_ID": 1, "ITEM_UNIT": "Pcs"}"#)),
        );
        assert_eq!(req.field(Location::Body, "ITEM_ID"), Some("1".to_string()));
        assert_eq!(req.field(Location::Body, "ITEM_UNIT"), Some("Pcs".to_string()));
    }

    #[test]
    fn test_form_body_fields() {
        let headers = HashMap::from([(
            "content-type".to_string(),
            "application/x-www-form-urlencoded; charset=utf-8".to_string(),
        )]);
        let req = Request::new(
            Method::Post,
            "/foods".to_string(),
            headers,
            Some(Bytes::from_static(b"ITEM_ID=2&ITEM_NAME=Chips")),
        );
        assert_eq!(req.body_fields().len(), 2);
        assert_eq!(req.field(Location::Body, "ITEM_NAME"), Some("Chips".to_string()));
    }

    #[test]
    fn test_garbage_body_has_no_fields() {
        let req = Request::new(
            Method::Post,
            "/foods".to_string(),
            json_headers(),
            Some(Bytes::from_static(b"{not json")),
        );
        assert!(req.body_fields().is_empty());
        assert_eq!(req.field(Location::Body, "ITEM_NAME"), None);
    }
}
