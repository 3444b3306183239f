//! Health check endpoint.
//!
//! Probes each collaborator: the vector store via a collection info
//! call, the LLM backend via its health check, and the pipeline via the
//! stored initialization outcome.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Per-component health strings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// Vector store connectivity and point count.
    pub vector_store: String,
    /// LLM backend reachability.
    pub llm: String,
    /// Pipeline initialization outcome.
    pub pipeline: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy".
    pub status: String,
    /// Component breakdown.
    pub components: ComponentHealth,
}

/// Service health with component breakdown.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health report", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let components = match state.pipeline() {
        Ok(handles) => {
            let vector_store = match handles.index.collection_info().await {
                Ok(info) => format!("healthy ({} points)", info.points_count),
                Err(e) => format!("unhealthy: {}", e),
            };
            let llm = match handles.backend.health_check().await {
                Ok(()) => "healthy".to_string(),
                Err(e) => format!("unhealthy: {}", e),
            };

            ComponentHealth {
                vector_store,
                llm,
                pipeline: "healthy".to_string(),
            }
        }
        Err(_) => {
            let reason = state.init_failure().unwrap_or("not initialized");
            ComponentHealth {
                vector_store: "unknown".to_string(),
                llm: "unknown".to_string(),
                pipeline: format!("unhealthy: {}", reason),
            }
        }
    };

    let healthy = components.vector_store.starts_with("healthy")
        && components.llm == "healthy"
        && components.pipeline == "healthy";

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        components,
    })
}
