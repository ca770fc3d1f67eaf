//! Request gates for the users API.
//!
//! Each stage either halts with a final response or continues with derived
//! state attached to the request:
//!
//! | Stage | Attaches | Halts with `400` and |
//! |---|---|---|
//! | [`resolve_user_id`] | [`User`] | `invalid user id` (or `500 There was an error`) |
//! | [`validate_user_body`] | [`NewUser`] | `missing user data`, `missing required name field` |
//! | [`validate_post_body`] | [`PostDraft`] | `missing post data`, `missing text field` |

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::middleware::json::JsonBody;
use crate::middleware::{Flow, Middleware};
use crate::model::{NewUser, PostDraft, User, UserId};
use crate::request::Request;
use crate::response::Json;
use crate::status::Status;
use crate::store::Store;

/// Looks up the `{id}` path parameter and attaches the [`User`].
///
/// Exactly one store read per request. An id that is not an integer cannot
/// name a user and is rejected without touching the store.
pub fn resolve_user_id(store: Arc<dyn Store>) -> impl Middleware {
    move |mut req: Request| {
        let store = Arc::clone(&store);
        async move {
            let Some(id) = req.param("id").and_then(|raw| raw.parse::<UserId>().ok()) else {
                return invalid_user_id();
            };

            match store.user_by_id(id).await {
                Ok(Some(user)) => {
                    req.extensions_mut().insert::<User>(user);
                    Flow::Continue(req)
                }
                Ok(None) => invalid_user_id(),
                Err(e) => {
                    warn!(error = %e, user_id = id, "user lookup failed");
                    Flow::halt((
                        Status::InternalServerError,
                        Json(json!({ "message": "There was an error" })),
                    ))
                }
            }
        }
    }
}

/// Gates user creation on the body carrying a non-empty string `name`.
pub async fn validate_user_body(mut req: Request) -> Flow {
    let Some(fields) = JsonBody::take(&mut req).into_fields() else {
        return bad_request("missing user data");
    };
    let Some(user) = NewUser::from_fields(fields) else {
        return bad_request("missing required name field");
    };

    req.extensions_mut().insert(user);
    Flow::Continue(req)
}

/// Gates post creation on the body carrying a non-empty string `text`.
pub async fn validate_post_body(mut req: Request) -> Flow {
    let Some(fields) = JsonBody::take(&mut req).into_fields() else {
        return bad_request("missing post data");
    };
    let Some(draft) = PostDraft::from_fields(fields) else {
        return bad_request("missing text field");
    };

    req.extensions_mut().insert(draft);
    Flow::Continue(req)
}

fn invalid_user_id() -> Flow {
    bad_request("invalid user id")
}

fn bad_request(message: &'static str) -> Flow {
    Flow::halt((Status::BadRequest, Json(json!({ "message": message }))))
}
