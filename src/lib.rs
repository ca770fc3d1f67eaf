//! # posts-api
//!
//! A small JSON API for users and their posts. Every route declares the gates
//! it passes through as an explicit, ordered middleware chain. Each gate either
//! halts with a response or hands the request on with derived state attached.
//!
//! ## The contract
//!
//! - `POST /api/users` needs a body with a non-empty `name`.
//! - Any `/api/users/{id}…` route first resolves `{id}` to a stored user
//!   (`400 {"message":"invalid user id"}` when there is none) and hands the
//!   record to the handler, so it is never fetched twice.
//! - `POST /api/users/{id}/posts` also needs a non-empty `text`; the post's
//!   `user_id` always comes from the path.
//! - A failed store call answers `500` with a fixed, route-specific message.
//!
//! What's deliberately absent: authentication, pagination, schema validation
//! beyond required fields, rate limiting, retries.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use posts_api::store::MemoryStore;
//! use posts_api::{Server, api};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = api::router(Arc::new(MemoryStore::new()));
//!
//!     Server::bind(([127, 0, 0, 1], 4000).into()).serve(app).await.unwrap();
//! }
//! ```
//!
//! ## In-process requests
//!
//! [`Router::dispatch`] runs the whole chain without a socket:
//!
//! ```rust
//! # use std::sync::Arc;
//! # use posts_api::store::MemoryStore;
//! # use posts_api::{Method, Request, api};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = api::router(Arc::new(MemoryStore::new()));
//! let res = app.dispatch(Request::new(Method::Get, "/api/users/7")).await;
//! assert_eq!(res.code(), 400);
//! # }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod health;
pub mod middleware;
pub mod model;
pub mod store;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
