//! JSON HTTP API over the tracker.
//!
//! Every handler hands its database work to `spawn_blocking`; the SQLite
//! connection for a request lives only inside that closure.

pub mod auth;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ServerError};

use crate::config::Config;
use crate::database::Database;
use crate::service::Tracker;

/// Server state shared across requests.
pub struct AppState {
    pub tracker: Tracker,
}

pub type SharedState = Arc<AppState>;

/// Run blocking storage work off the async runtime
pub(crate) async fn run_blocking<T, E, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(Into::into)
}

/// Build the API router around `tracker`
pub fn router(tracker: Tracker) -> Router {
    let state = Arc::new(AppState { tracker });

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/register", post(routes::register))
        .route("/api/login", post(routes::login))
        .route("/api/logout", post(routes::logout))
        .route("/api/dashboard", get(routes::dashboard))
        .route("/api/cards", post(routes::add_card))
        .route("/api/cards/{id}", delete(routes::delete_card))
        .route("/api/cards/{id}/review", post(routes::review_card))
        .route("/api/review", get(routes::review_queue))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API on the configured address until Ctrl-C.
pub async fn serve(config: &Config) -> Result<(), ServerError> {
    let addr = config.bind_addr()?;
    let db = Database::open(config.database.clone())?;
    let app = router(Tracker::new(db));

    let listener = TcpListener::bind(addr).await?;
    log::info!(
        "Serving on http://{} (database {})",
        listener.local_addr()?,
        config.database.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutting down"),
        Err(e) => {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
