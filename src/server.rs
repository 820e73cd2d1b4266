//! HTTP surface: the streaming generate endpoint plus the chat and improve endpoints.
//!
//! Per-request and stateless. The only shared state is the backend client wrapped by the
//! generator and the assist service.

use crate::assist::AssistService;
use crate::error::ApiError;
use crate::generator::SectionGenerator;
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod handlers;

pub const GENERATE_ROUTE: &str = "/api/generate";
pub const CHAT_ROUTE: &str = "/api/chat";
pub const IMPROVE_ROUTE: &str = "/api/improve";

pub struct AppState {
    pub generator: SectionGenerator,
    pub assist: AssistService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(GENERATE_ROUTE, post(handlers::generate))
        .route(CHAT_ROUTE, post(handlers::chat))
        .route(IMPROVE_ROUTE, post(handlers::improve))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve on an already-bound listener until Ctrl-C.
pub async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) -> Result<(), ApiError> {
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "Serving generate, chat and improve endpoints");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

pub async fn bind_and_serve(bind: &str, state: Arc<AppState>) -> Result<(), ApiError> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    serve(listener, state).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!(error = %e, "Could not listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await
        }
    }
}
