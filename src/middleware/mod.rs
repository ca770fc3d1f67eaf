//! Middleware layer.
//!
//! A middleware is an async stage that sees the request before the handler
//! does and decides one of two things:
//!
//! - [`Flow::Continue`]: hand the (possibly enriched) request to the next
//!   stage;
//! - [`Flow::Halt`]: answer now. Nothing after it runs.
//!
//! Those are the only two outcomes a stage can return, so a stage that has
//! answered cannot also continue.
//!
//! Chains are explicit and per route:
//!
//! ```rust,no_run
//! use posts_api::middleware::{Chain, Flow};
//! use posts_api::{Method, Request, Response, Router, Status};
//!
//! async fn require_body(req: Request) -> Flow {
//!     if req.body().is_empty() {
//!         return Flow::halt(Status::BadRequest);
//!     }
//!     Flow::Continue(req)
//! }
//!
//! async fn create(_req: Request) -> Response { Response::status(Status::Created) }
//!
//! Router::new().on(Method::Post, "/things", Chain::new().then(require_body).handle(create));
//! ```
//!
//! Router-wide stages registered with [`Router::layer`](crate::Router::layer)
//! run before every route's own chain; [`json`] is one.

pub mod json;

use std::future::Future;
use std::sync::Arc;

use crate::handler::sealed::Sealed;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// What a middleware stage decided.
pub enum Flow {
    Continue(Request),
    Halt(Response),
}

impl Flow {
    /// Stop the request here with `res`.
    pub fn halt(res: impl IntoResponse) -> Self {
        Self::Halt(res.into_response())
    }
}

#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn Fn(Request) -> BoxFuture<Flow> + Send + Sync + 'static>;

/// Implemented for every `Fn(Request) -> impl Future<Output = Flow>`.
pub trait Middleware: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Flow> + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(move |req: Request| -> BoxFuture<Flow> { Box::pin(self(req)) })
    }
}

/// Runs `stages` in order, then `handler` if every stage continued.
pub(crate) async fn run(
    stages: &[BoxedMiddleware],
    handler: &BoxedHandler,
    mut req: Request,
) -> Response {
    for stage in stages {
        match stage(req).await {
            Flow::Continue(next) => req = next,
            Flow::Halt(res) => return res,
        }
    }
    handler(req).await
}

/// An ordered list of middleware waiting for its terminal handler.
#[derive(Default)]
pub struct Chain {
    stages: Vec<BoxedMiddleware>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Stages run in the order they were added.
    pub fn then(mut self, stage: impl Middleware) -> Self {
        self.stages.push(stage.into_boxed_middleware());
        self
    }

    /// Terminates the chain with `handler`.
    pub fn handle(self, handler: impl Handler) -> Pipeline {
        Pipeline { stages: self.stages, handler: handler.into_boxed_handler() }
    }
}

/// A chain plus its handler, ready to be registered on a route.
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
    handler: BoxedHandler,
}

impl Pipeline {
    pub(crate) async fn call(&self, req: Request) -> Response {
        run(&self.stages, &self.handler, req).await
    }
}

impl Sealed for Pipeline {}

impl Handler for Pipeline {
    fn into_boxed_handler(self) -> BoxedHandler {
        let pipeline = Arc::new(self);
        Arc::new(move |req: Request| -> BoxFuture<Response> {
            let pipeline = Arc::clone(&pipeline);
            Box::pin(async move { pipeline.call(req).await })
        })
    }
}
