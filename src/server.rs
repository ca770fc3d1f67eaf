//! TCP listener, per-connection tasks, graceful shutdown.
//!
//! Once the shutdown future resolves the server stops accepting, waits for
//! every open connection task to finish, and then returns.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;

pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Nothing is bound until [`serve`](Server::serve) runs.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains open connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `shutdown` resolves, then drains open
    /// connections.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %listener.local_addr()?, "posts-api listening");

        // One routing table, shared by every connection task.
        let router = Arc::new(router);
        // Every spawned connection lives here until it finishes, so shutdown
        // can wait for all of them.
        let mut connections = JoinSet::new();
        // `select!` polls the same shutdown future on each turn of the loop,
        // so it has to stay put in memory.
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Arms are polled top to bottom. A pending shutdown therefore
                // wins over a backlog of queued connections.
                biased;

                () = &mut shutdown => break,

                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(serve_connection(stream, peer, Arc::clone(&router)));
                    }
                    Err(e) => error!(error = %e, "accept failed"),
                },

                // Finished tasks are removed as they complete. Without this
                // the set keeps one entry per connection ever accepted.
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        info!(open = connections.len(), "shutting down, draining connections");
        // Nothing is accepted past this point. Open connections run to
        // completion.
        while connections.join_next().await.is_some() {}
        info!("posts-api stopped");
        Ok(())
    }
}

async fn serve_connection(stream: TcpStream, peer: SocketAddr, router: Arc<Router>) {
    debug!(%peer, "connection opened");
    let service = service_fn(move |req| respond(Arc::clone(&router), req));

    // The auto builder sniffs the preface and speaks HTTP/1.1 or HTTP/2.
    let builder = Builder::new(TokioExecutor::new());
    if let Err(e) = builder.serve_connection(TokioIo::new(stream), service).await {
        warn!(%peer, error = %e, "connection closed with error");
    }
}

/// One request in, one response out, logged inside a `request` span.
async fn respond(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let span = info_span!("request", method = %req.method(), path = %req.uri().path());
    async move {
        let started = Instant::now();
        let res = route(&router, req).await;
        info!(
            status = res.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        Ok(res.into_http())
    }
    .instrument(span)
    .await
}

async fn route(router: &Router, req: hyper::Request<Incoming>) -> Response {
    let Ok(method) = Method::try_from(req.method()) else {
        return (Status::MethodNotAllowed, Json(json!({ "message": "method not allowed" })))
            .into_response();
    };

    let (parts, body) = req.into_parts();
    match body.collect().await {
        Ok(collected) => {
            router.dispatch(Request::from_parts(method, parts, collected.to_bytes())).await
        }
        Err(e) => {
            warn!(error = %e, "failed to read request body");
            (Status::BadRequest, Json(json!({ "message": "unreadable request body" })))
                .into_response()
        }
    }
}

/// Resolves on SIGTERM (Unix) or Ctrl-C, whichever comes first. A signal
/// whose handler cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!("received Ctrl-C"),
        () = terminate => info!("received SIGTERM"),
    }
}
