use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{accounts, transfers, users};
use engine::Store;

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn Store>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/users", post(users::user_new))
        .route("/users/{username}", get(users::get))
        .route("/accounts", post(accounts::account_new).get(accounts::list))
        .route("/accounts/{id}", get(accounts::get))
        .route("/accounts/{id}/entries", get(accounts::entries))
        .route("/accounts/{id}/transfers", get(accounts::transfers))
        .route("/entries/{id}", get(accounts::entry))
        .route("/transfers", post(transfers::transfer_new))
        .route("/transfers/{id}", get(transfers::get))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// Serve the API on `listener` until ctrl-c. In-flight requests finish
/// before the function returns.
pub async fn run_with_listener(
    store: Arc<dyn Store>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { store };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}
