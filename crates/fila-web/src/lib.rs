//! Fila Web Server
//!
//! Axum-based server exposing the ticket REST API, the real-time WebSocket
//! endpoint for callers and displays, and an internal notify relay.

pub mod error;
pub mod identity;
pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/tickets",
            get(routes::tickets::list_tickets).post(routes::tickets::create_ticket),
        )
        .route("/tickets/waiting", get(routes::tickets::list_waiting))
        .route("/tickets/{id}", get(routes::tickets::get_ticket))
        .route("/tickets/{id}/call", post(routes::tickets::call_ticket))
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(routes::internal::health))
        .route("/ws", get(websocket::ws_handler))
        .route("/internal/notify", post(routes::internal::notify))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down web server");
}
