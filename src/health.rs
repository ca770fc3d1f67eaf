//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the store answer? Failure → pulled from load-balancer. |

use std::sync::Arc;

use tracing::warn;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;
use crate::store::Store;

/// Always `200 OK` with body `"ok"`. If the process can respond to HTTP at
/// all, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 ready` while `store` answers a ping, `503 not ready` otherwise.
pub fn readiness(store: Arc<dyn Store>) -> impl Handler {
    move |_req: Request| {
        let store = Arc::clone(&store);
        async move {
            match store.ping().await {
                Ok(()) => Response::text("ready"),
                Err(e) => {
                    warn!(error = %e, "readiness check failed");
                    Response::builder().status(Status::ServiceUnavailable).text("not ready")
                }
            }
        }
    }
}
