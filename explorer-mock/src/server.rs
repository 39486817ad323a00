/// Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::ExplorerState;

pub fn create_router(state: Arc<ExplorerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/infos", get(get_infos))

        // Address endpoints
        .route("/addresses/:address/balance", get(get_address_balance))
        .route("/addresses/:address/total-transactions", get(get_total_transactions))
        .route("/addresses/:address/transactions", get(get_address_transactions))
        .route(
            "/addresses/:address/unconfirmed-transactions",
            get(get_unconfirmed_transactions),
        )

        // Mock helper endpoints
        .route("/mock/addresses/:address/balance", post(set_address_balance))
        .route("/mock/unconfirmed", post(add_unconfirmed))
        .route("/mock/confirm/:hash", post(confirm_transaction))

        // Shared state
        .with_state(state)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(state: Arc<ExplorerState>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Explorer mock server listening on http://{}", addr);
    log::info!("🔨 Confirm endpoint: POST /mock/confirm/:hash");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve `state` on an ephemeral localhost port in the background
pub async fn spawn_test_server(state: Arc<ExplorerState>) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(state);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Explorer mock server stopped: {}", e);
        }
    });

    Ok(addr)
}
