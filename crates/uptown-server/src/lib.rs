//! HTTP API server for Uptown event recommendations.
//!
//! Exposes the recommendation pipeline over three routes:
//!
//! - `GET /` — service banner
//! - `POST /recommend` — run (or serve from cache) a recommendation
//! - `GET /health` — component health report
//!
//! The pipeline is initialized eagerly when the state is built; a
//! failed initialization keeps the server up and is surfaced by
//! `/health` and as 503s from `/recommend`.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ErrorResponse, Result, ServerError};
pub use routes::{RecommendRequest, RecommendResponse};
pub use state::AppState;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The Uptown HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(routes::root))
            .route("/recommend", post(routes::recommend))
            .route("/health", get(routes::health))
            .layer(cors_layer(&self.state.settings().cors_origins))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.settings().bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

        info!(address = %addr, "Server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))
    }
}

/// Build the CORS layer from configured origins. An empty list allows
/// any origin (development mode).
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(parsed)
}
