//! The status codes this service answers with.
//!
//! A [`Status`] can be returned from a handler on its own, given to
//! [`ResponseBuilder::status`](crate::ResponseBuilder::status), or paired with
//! a [`Json`](crate::Json) body:
//!
//! ```rust
//! use posts_api::{IntoResponse, Json, Status};
//! use serde_json::json;
//!
//! let res = (Status::BadRequest, Json(json!({ "message": "invalid user id" }))).into_response();
//! assert_eq!(res.code(), 400);
//! ```

use http::StatusCode;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
    ServiceUnavailable,
}

impl From<Status> for StatusCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => StatusCode::OK,
            Status::Created => StatusCode::CREATED,
            Status::NoContent => StatusCode::NO_CONTENT,
            Status::BadRequest => StatusCode::BAD_REQUEST,
            Status::NotFound => StatusCode::NOT_FOUND,
            Status::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Status::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Status::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
