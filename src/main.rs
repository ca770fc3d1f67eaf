//! posts-api server.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl -X POST http://localhost:4000/api/users \
//!        -H 'content-type: application/json' -d '{"name":"alice"}'
//!   curl http://localhost:4000/api/users/1
//!   curl -X POST http://localhost:4000/api/users/1/posts \
//!        -H 'content-type: application/json' -d '{"text":"hi"}'
//!   curl http://localhost:4000/api/users/1/posts

use posts_api::{Config, Error, Server, api};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let store = config.open_store()?;

    Server::bind(config.addr).serve(api::router(store)).await
}
