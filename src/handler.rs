//! Route targets and how the router stores them.
//!
//! Every route target, whatever its concrete type, is stored as the same
//! boxed closure:
//!
//! ```text
//! async fn list_users(req: Request) -> Json<Vec<User>>     route code
//!        | Handler::into_boxed_handler
//! Arc<dyn Fn(Request) -> BoxFuture<Response>>              what the tree holds
//!        | at request time
//! handler(req).await                                       one indirect call
//! ```
//!
//! A [`Pipeline`](crate::middleware::Pipeline) (middleware chain plus its
//! terminal handler) is a `Handler` too, so guarded and unguarded routes
//! register the same way.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture<Response> + Send + Sync + 'static>;

/// Anything that can answer a routed request.
///
/// Implemented for every
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// and for [`Pipeline`](crate::middleware::Pipeline). Sealed.
pub trait Handler: sealed::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

// Public trait in a crate-private module: outside code can name `Handler`
// but cannot implement it.
pub(crate) mod sealed {
    pub trait Sealed {}
}

impl<F, Fut, R> sealed::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(move |req: Request| -> BoxFuture<Response> {
            // `self(req)` yields the handler's own future type. Converting its
            // output and boxing it gives every route the same signature.
            let fut = self(req);
            Box::pin(async move { fut.await.into_response() })
        })
    }
}
