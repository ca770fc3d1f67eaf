//! Outgoing responses and the [`IntoResponse`] conversion.
//!
//! Handlers rarely build a [`Response`] by hand. Most return a [`Status`], a
//! string, or a [`Json`] value (optionally paired with a status) and let
//! [`IntoResponse`] do the rest.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

use crate::status::Status;

const TEXT: &str = "text/plain; charset=utf-8";
const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";

/// A fully buffered response.
///
/// ```rust
/// use http::header::LOCATION;
/// use http::HeaderValue;
/// use posts_api::{Response, Status};
///
/// let res = Response::builder()
///     .status(Status::Created)
///     .header(LOCATION, HeaderValue::from_static("/api/users/42"))
///     .json_bytes(br#"{"id":42}"#.to_vec());
///
/// assert_eq!(res.code(), 201);
/// assert_eq!(res.header("location"), Some("/api/users/42"));
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200` with a `text/plain` body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// `status` with no body.
    pub fn status(status: Status) -> Self {
        Self::builder().status(status).empty()
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: StatusCode::OK, headers: HeaderMap::new() }
    }

    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

/// Sets status and headers, then ends with one body method.
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseBuilder {
    pub fn status(mut self, status: Status) -> Self {
        self.status = status.into();
        self
    }

    /// Appends a header. The body methods set `content-type` themselves.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, Bytes::from(body.into()))
    }

    pub fn html(self, body: impl Into<Bytes>) -> Response {
        self.finish(HTML, body.into())
    }

    /// Ends with an already encoded JSON document.
    pub fn json_bytes(self, body: impl Into<Bytes>) -> Response {
        self.finish(JSON, body.into())
    }

    pub fn empty(self) -> Response {
        Response { status: self.status, headers: self.headers, body: Bytes::new() }
    }

    fn finish(mut self, content_type: &'static str, body: Bytes) -> Response {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Response { status: self.status, headers: self.headers, body }
    }
}

/// Anything a handler may return.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        Response::status(self)
    }
}

/// A serde-serialisable body sent as `application/json`.
///
/// On its own it answers `200 OK`; pair it with a [`Status`] for anything
/// else:
///
/// ```rust
/// use posts_api::{IntoResponse, Json, Status};
/// use serde_json::json;
///
/// let res = (Status::Created, Json(json!({ "id": 1, "name": "alice" }))).into_response();
/// assert_eq!(res.code(), 201);
/// ```
///
/// A value that fails to serialise becomes an empty `500`.
#[derive(Debug)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        (Status::Ok, self).into_response()
    }
}

impl<T: Serialize> IntoResponse for (Status, Json<T>) {
    fn into_response(self) -> Response {
        let (status, Json(value)) = self;
        match serde_json::to_vec(&value) {
            Ok(bytes) => Response::builder().status(status).json_bytes(bytes),
            Err(e) => {
                warn!(error = %e, "response body failed to serialise");
                Response::status(Status::InternalServerError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http::header::LOCATION;
    use serde_json::json;

    use super::*;

    #[test]
    fn json_pairs_status_with_body() {
        let res = (Status::BadRequest, Json(json!({ "message": "missing user data" })))
            .into_response();

        assert_eq!(res.code(), 400);
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        assert_eq!(res.body(), br#"{"message":"missing user data"}"#);
    }

    #[test]
    fn body_method_owns_the_content_type() {
        let res = Response::builder()
            .header(CONTENT_TYPE, HeaderValue::from_static("image/png"))
            .header(LOCATION, HeaderValue::from_static("/"))
            .html("<p>hi</p>")
            .into_http();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(res.headers()[LOCATION], "/");
    }

    #[test]
    fn bare_status_has_no_body_or_content_type() {
        let res = Status::NoContent.into_response();

        assert_eq!(res.code(), 204);
        assert!(res.body().is_empty());
        assert_eq!(res.header("content-type"), None);
    }
}
