//! The users-and-posts API.
//!
//! | Method | Path | Gates | Handler |
//! |---|---|---|---|
//! | GET | `/` | — | [`index`] |
//! | POST | `/api/users` | user body | [`users::create_user`] |
//! | GET | `/api/users` | — | [`users::list_users`] |
//! | GET | `/api/users/{id}` | user id | [`users::get_user`] |
//! | PUT | `/api/users/{id}` | user id | [`users::update_user`] |
//! | DELETE | `/api/users/{id}` | user id | [`users::delete_user`] |
//! | GET | `/api/users/{id}/posts` | user id | [`users::user_posts`] |
//! | POST | `/api/users/{id}/posts` | user id, post body | [`users::create_post`] |
//!
//! Plus the `/healthz` and `/readyz` probes from [`health`](crate::health).
//! Every route sees the body through the router-wide [`json::parse`] layer.

pub mod users;
pub mod validate;

use std::future::Future;
use std::sync::Arc;

use crate::health;
use crate::method::Method;
use crate::middleware::{Chain, json};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::store::Store;

use validate::{resolve_user_id, validate_post_body, validate_user_body};

/// Builds the full application router over `store`.
pub fn router(store: Arc<dyn Store>) -> Router {
    let user_id = || resolve_user_id(Arc::clone(&store));

    Router::new()
        .layer(json::parse)
        .on(Method::Get, "/", index)
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz", health::readiness(Arc::clone(&store)))
        .on(
            Method::Post,
            "/api/users",
            Chain::new()
                .then(validate_user_body)
                .handle(with_store(&store, users::create_user)),
        )
        .on(Method::Get, "/api/users", with_store(&store, users::list_users))
        .on(
            Method::Get,
            "/api/users/{id}",
            Chain::new().then(user_id()).handle(users::get_user),
        )
        .on(
            Method::Put,
            "/api/users/{id}",
            Chain::new().then(user_id()).handle(with_store(&store, users::update_user)),
        )
        .on(
            Method::Delete,
            "/api/users/{id}",
            Chain::new().then(user_id()).handle(with_store(&store, users::delete_user)),
        )
        .on(
            Method::Get,
            "/api/users/{id}/posts",
            Chain::new().then(user_id()).handle(with_store(&store, users::user_posts)),
        )
        .on(
            Method::Post,
            "/api/users/{id}/posts",
            Chain::new()
                .then(user_id())
                .then(validate_post_body)
                .handle(with_store(&store, users::create_post)),
        )
}

/// `GET /`: a static landing fragment.
pub async fn index(_req: Request) -> Response {
    Response::builder().html("<h2>posts-api: users and their posts live under /api/users</h2>")
}

/// Adapts a `(store, request)` handler to the router's `request`-only shape
/// by capturing its own handle on the store.
fn with_store<F, Fut>(
    store: &Arc<dyn Store>,
    handler: F,
) -> impl Fn(Request) -> Fut + Send + Sync + use<F, Fut>
where
    F: Fn(Arc<dyn Store>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let store = Arc::clone(store);
    move |req: Request| handler(Arc::clone(&store), req)
}
