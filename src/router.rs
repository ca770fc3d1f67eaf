//! Method and path routing.
//!
//! Each method gets its own `matchit` tree. Router-wide middleware registered
//! with [`Router::layer`] runs before every matched route's own chain.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use serde_json::json;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{self, BoxedMiddleware, Middleware};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

type Tree = matchit::Router<BoxedHandler>;

/// Built once at startup and handed to [`Server::serve`](crate::Server::serve).
#[derive(Default)]
pub struct Router {
    trees: HashMap<Method, Tree>,
    layers: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler (or a [`Pipeline`](crate::middleware::Pipeline))
    /// for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use posts_api::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/api/users/{id}", get_user)
    ///     .on(Method::Post, "/api/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.trees
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Register a stage that runs before every routed request, in
    /// registration order.
    pub fn layer(mut self, stage: impl Middleware) -> Self {
        self.layers.push(stage.into_boxed_middleware());
        self
    }

    /// Routes one request and produces one response.
    ///
    /// A trailing slash is ignored, so `/api/users/` matches `/api/users`.
    /// Unknown paths answer `404`; nothing here ever fails.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let Some(handler) = self.resolve(&mut req) else {
            return (Status::NotFound, Json(json!({ "message": "not found" }))).into_response();
        };
        middleware::run(&self.layers, handler, req).await
    }

    /// Finds the route for `req` and copies its path parameters onto it.
    fn resolve(&self, req: &mut Request) -> Option<&BoxedHandler> {
        let tree = self.trees.get(&req.method())?;
        let path = req.path();
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        let matched = tree.at(path).ok()?;
        let handler = matched.value;
        let params: HashMap<String, String> = matched
            .params
            .iter()
            .map(|(name, value)| (name.to_owned(), decode(value)))
            .collect();
        req.params = params;
        Some(handler)
    }
}

/// Percent-decodes a path segment. A segment that does not decode to UTF-8
/// is passed on as received.
fn decode(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_owned(),
    }
}
