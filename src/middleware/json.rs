//! JSON body parser.
//!
//! Install once with `Router::layer(json::parse)`. It parses the collected
//! body a single time and stores the result as a [`JsonBody`] extension, so
//! later stages never re-read the bytes.
//!
//! | Body | Result |
//! |---|---|
//! | empty or whitespace | `JsonBody(None)` |
//! | non-JSON `content-type` | `JsonBody(None)`, bytes untouched |
//! | valid JSON | `JsonBody(Some(value))` |
//! | malformed JSON | `400 {"message": "malformed JSON body"}` |
//!
//! A missing `content-type` is treated as JSON.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::middleware::Flow;
use crate::request::Request;
use crate::response::Json;
use crate::status::Status;

/// The parsed request body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonBody(pub Option<Value>);

impl JsonBody {
    /// Removes the parsed body from `req`. A request that never went through
    /// [`parse`] has no body.
    pub fn take(req: &mut Request) -> Self {
        req.extensions_mut().remove::<Self>().unwrap_or_default()
    }

    /// The body's fields, if it is an object with at least one key.
    ///
    /// Absent bodies, `null`, `{}` and non-object values (arrays, strings,
    /// numbers, booleans) all carry no named fields and yield `None`.
    pub fn into_fields(self) -> Option<Map<String, Value>> {
        match self.0 {
            Some(Value::Object(map)) if !map.is_empty() => Some(map),
            _ => None,
        }
    }
}

/// Router-wide body-parsing stage.
pub async fn parse(mut req: Request) -> Flow {
    let body = if is_blank(req.body()) || !is_json(req.header("content-type")) {
        None
    } else {
        match serde_json::from_slice::<Value>(req.body()) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, path = req.path(), "rejecting malformed JSON body");
                return Flow::halt((
                    Status::BadRequest,
                    Json(json!({ "message": "malformed JSON body" })),
                ));
            }
        }
    };

    req.extensions_mut().insert(JsonBody(body));
    Flow::Continue(req)
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn is_json(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let essence = ct.split(';').next().unwrap_or_default().trim();
            essence.eq_ignore_ascii_case("application/json")
                || essence.to_ascii_lowercase().ends_with("+json")
        }
    }
}

#[cfg(test)]
mod tests {
    use http::header::{CONTENT_TYPE, HeaderValue};

    use super::*;
    use crate::Method;

    async fn parsed(req: Request) -> Result<JsonBody, u16> {
        match parse(req).await {
            Flow::Continue(mut req) => Ok(JsonBody::take(&mut req)),
            Flow::Halt(res) => Err(res.code()),
        }
    }

    #[tokio::test]
    async fn empty_and_whitespace_bodies_are_absent() {
        let empty = Request::new(Method::Post, "/");
        let blank = Request::new(Method::Post, "/").with_body(" \n");

        assert_eq!(parsed(empty).await, Ok(JsonBody(None)));
        assert_eq!(parsed(blank).await, Ok(JsonBody(None)));
    }

    #[tokio::test]
    async fn json_bodies_are_parsed() {
        let req = Request::new(Method::Post, "/").with_json(&json!({ "name": "alice" }));

        assert_eq!(parsed(req).await, Ok(JsonBody(Some(json!({ "name": "alice" })))));
    }

    #[tokio::test]
    async fn charset_and_suffix_media_types_count_as_json() {
        let charset = Request::new(Method::Put, "/")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"))
            .with_body(r#"{"a":1}"#);
        let patch = Request::new(Method::Put, "/")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/merge-patch+json"))
            .with_body(r#"{"a":1}"#);

        assert_eq!(parsed(charset).await, Ok(JsonBody(Some(json!({ "a": 1 })))));
        assert_eq!(parsed(patch).await, Ok(JsonBody(Some(json!({ "a": 1 })))));
    }

    #[tokio::test]
    async fn other_content_types_are_ignored() {
        let req = Request::new(Method::Post, "/")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_body("name=alice");

        assert_eq!(parsed(req).await, Ok(JsonBody(None)));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let req = Request::new(Method::Post, "/").with_body(r#"{"name": "#);

        assert_eq!(parsed(req).await, Err(400));
    }

    #[test]
    fn only_non_empty_objects_have_fields() {
        assert_eq!(JsonBody(None).into_fields(), None);
        assert_eq!(JsonBody(Some(Value::Null)).into_fields(), None);
        assert_eq!(JsonBody(Some(json!({}))).into_fields(), None);
        assert_eq!(JsonBody(Some(json!(["name"]))).into_fields(), None);
        assert_eq!(JsonBody(Some(json!("alice"))).into_fields(), None);
        assert!(JsonBody(Some(json!({ "x": 1 }))).into_fields().is_some());
    }
}
