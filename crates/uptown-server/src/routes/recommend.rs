//! Recommendation endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use uptown_pipeline::{FilterSet, ScoredEvent};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Smallest accepted `top_k`.
const MIN_TOP_K: usize = 1;

/// Largest accepted `top_k`.
const MAX_TOP_K: usize = 20;

/// Default `top_k` when the request omits it.
const DEFAULT_TOP_K: usize = 5;

/// Recommendation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecommendRequest {
    /// Free-text query about NYC events.
    pub query: String,
    /// Number of candidates to retrieve (1..=20). Defaults to 5.
    pub top_k: Option<usize>,
}

/// Recommendation response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecommendResponse {
    /// The original query.
    pub query: String,
    /// Filters extracted from the query.
    #[schema(value_type = Object)]
    pub filters: FilterSet,
    /// Natural-language recommendation text.
    pub response: String,
    /// Retrieved candidates, descending by score.
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<ScoredEvent>,
    /// Number of retrieved candidates.
    pub num_events: usize,
    /// Whether this result was served from the cache.
    pub cached: bool,
}

/// Validate and default the requested candidate count.
fn validate_top_k(top_k: Option<usize>) -> Result<usize> {
    match top_k {
        None => Ok(DEFAULT_TOP_K),
        Some(k) if (MIN_TOP_K..=MAX_TOP_K).contains(&k) => Ok(k),
        Some(k) => Err(ServerError::BadRequest(format!(
            "top_k must be between {} and {}, got {}",
            MIN_TOP_K, MAX_TOP_K, k
        ))),
    }
}

/// Run the recommendation pipeline for a query.
#[utoipa::path(
    post,
    path = "/recommend",
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Recommendation generated", body = RecommendResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Pipeline failure"),
        (status = 503, description = "Pipeline not initialized"),
    ),
    tag = "recommend"
)]
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>> {
    if request.query.trim().is_empty() {
        return Err(ServerError::BadRequest("query must not be empty".to_string()));
    }
    let top_k = validate_top_k(request.top_k)?;

    if let Some(hit) = state.cache().lookup(&request.query) {
        info!(query = %request.query, "Serving cached recommendation");
        return Ok(Json(RecommendResponse {
            query: request.query,
            filters: hit.filters,
            response: hit.response,
            num_events: hit.events.len(),
            events: hit.events,
            cached: true,
        }));
    }

    let handles = state.pipeline()?;
    let recommendation = handles.pipeline.run(&request.query, top_k).await?;

    state.cache().store(&request.query, recommendation.clone());

    Ok(Json(RecommendResponse {
        query: recommendation.query,
        filters: recommendation.filters,
        response: recommendation.response,
        num_events: recommendation.events.len(),
        events: recommendation.events,
        cached: false,
    }))
}
