//! HTTP Gateway
//!
//! Routes (all responses use the `{code, msg, data}` envelope):
//!
//! - `/api/v1/accounts` and `/api/v1/accounts/{id}`: account CRUD
//! - `/api/v1/accounts/{id}/entries`: ledger lines of an account
//! - `/api/v1/transfers` and `/api/v1/transfers/{id}`: post and read transfers
//! - `/api/v1/health`
//! - `/docs`: Swagger UI over `/api-docs/openapi.json`

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

/// Build the complete router over `state`
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        // Accounts
        .route(
            "/api/v1/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/api/v1/accounts/",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/api/v1/accounts/{id}",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .route("/api/v1/accounts/{id}/entries", get(handlers::list_entries))
        // Transfers
        .route("/api/v1/transfers", post(handlers::create_transfer))
        .route("/api/v1/transfers/", post(handlers::create_transfer))
        .route("/api/v1/transfers/{id}", get(handlers::get_transfer))
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start HTTP Gateway server; returns after Ctrl-C once in-flight requests finish
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port may already be in use)", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
