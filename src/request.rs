//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::Extensions;
use serde::Serialize;

use crate::method::Method;

/// An incoming HTTP request with its body fully collected.
///
/// Besides the wire data a request carries [`Extensions`]: a typed map that
/// middleware uses to hand derived state (a resolved record, a parsed body)
/// to the stages after it. Extensions live exactly as long as the request.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    pub(crate) params: HashMap<String, String>,
    extensions: Extensions,
}

impl Request {
    /// A bodyless request. Mostly useful for driving a
    /// [`Router`](crate::Router) in-process.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    pub(crate) fn from_parts(method: Method, parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            body,
            params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and the matching `content-type`.
    pub fn with_json<T: Serialize>(self, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        self.with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body)
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Derived per-request state set by earlier middleware.
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::Post, "/api/users")
            .with_json(&serde_json::json!({ "name": "alice" }));

        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body(), br#"{"name":"alice"}"#);
    }

    #[test]
    fn extensions_carry_typed_state() {
        #[derive(Clone, Debug, PartialEq)]
        struct Marker(u8);

        let mut req = Request::new(Method::Get, "/");
        req.extensions_mut().insert(Marker(7));

        assert_eq!(req.extensions().get::<Marker>(), Some(&Marker(7)));
    }
}
