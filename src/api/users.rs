//! Route handlers for `/api/users`.
//!
//! Each handler runs after its route's gates, makes at most one store call,
//! and maps the outcome to a response. Store failures are logged and answered
//! with a fixed 500 payload; their detail never reaches the client.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::middleware::json::JsonBody;
use crate::model::{NewUser, PostDraft, User};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::store::Store;

/// `POST /api/users`
pub async fn create_user(store: Arc<dyn Store>, mut req: Request) -> Response {
    const FAILED: Failure = Failure("errorMessage", "Error creating the user");

    let Some(user) = req.extensions_mut().remove::<NewUser>() else {
        return FAILED.into_response();
    };
    match store.insert_user(user).await {
        Ok(created) => (Status::Created, Json(created)).into_response(),
        Err(e) => FAILED.logged(&e),
    }
}

/// `GET /api/users`
pub async fn list_users(store: Arc<dyn Store>, _req: Request) -> Response {
    match store.users().await {
        Ok(users) => Json(users).into_response(),
        Err(e) => Failure("error", "The user list could not be retrieved.").logged(&e),
    }
}

/// `GET /api/users/{id}`: answers from the record the id gate attached.
pub async fn get_user(req: Request) -> Response {
    match resolved(&req) {
        Some(user) => Json(user).into_response(),
        None => Failure("message", "Error retrieving the user").into_response(),
    }
}

/// `GET /api/users/{id}/posts`
pub async fn user_posts(store: Arc<dyn Store>, req: Request) -> Response {
    const FAILED: Failure = Failure("errorMessage", "Error retriving user posts");

    let Some(user) = resolved(&req) else {
        return FAILED.into_response();
    };
    match store.user_posts(user.id).await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => FAILED.logged(&e),
    }
}

/// `PUT /api/users/{id}`: shallow-merges the body into the user.
pub async fn update_user(store: Arc<dyn Store>, mut req: Request) -> Response {
    const FAILED: Failure = Failure("errorMessage", "Error updating user");

    let Some(id) = resolved(&req).map(|user| user.id) else {
        return FAILED.into_response();
    };
    let changes = match JsonBody::take(&mut req).0 {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    match store.update_user(id, changes).await {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => FAILED.logged(&e),
    }
}

/// `DELETE /api/users/{id}`: answers with the removed record.
pub async fn delete_user(store: Arc<dyn Store>, req: Request) -> Response {
    const FAILED: Failure = Failure("errorMessage", "Error deleting user");

    let Some(user) = resolved(&req) else {
        return FAILED.into_response();
    };
    match store.remove_user(user.id).await {
        Ok(removed) => Json(removed).into_response(),
        Err(e) => FAILED.logged(&e),
    }
}

/// `POST /api/users/{id}/posts`: the post's owner is the resolved user,
/// whatever the body says.
pub async fn create_post(store: Arc<dyn Store>, mut req: Request) -> Response {
    const FAILED: Failure = Failure("errorMessage", "error creating post");

    let Some(user_id) = resolved(&req).map(|user| user.id) else {
        return FAILED.into_response();
    };
    let Some(draft) = req.extensions_mut().remove::<PostDraft>() else {
        return FAILED.into_response();
    };
    match store.insert_post(draft.for_user(user_id)).await {
        Ok(post) => (Status::Created, Json(post)).into_response(),
        Err(e) => FAILED.logged(&e),
    }
}

fn resolved(req: &Request) -> Option<&User> {
    req.extensions().get::<User>()
}

/// A fixed `500` body: `{ <field>: <message> }`.
///
/// The field name differs per route (`message`, `errorMessage`, `error`) and
/// existing clients match on it, so it is kept per route.
struct Failure(&'static str, &'static str);

impl Failure {
    fn logged(self, error: &dyn std::error::Error) -> Response {
        warn!(error = %error, response = self.1, "store call failed");
        self.into_response()
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert(self.0.to_owned(), Value::from(self.1));
        (Status::InternalServerError, Json(body)).into_response()
    }
}
