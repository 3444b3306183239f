//! Root endpoint.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Root response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    /// Human-readable service banner.
    pub message: String,
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Service banner (no auth required).
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = RootResponse),
    ),
    tag = "meta"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "NYC Event Recommender API".to_string(),
        status: "online".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
