//! Qdrant REST API client.
//!
//! Implements [`VectorIndex`] against a Qdrant server. Only the small
//! surface the pipeline needs is covered: collection creation, point
//! upsert, filtered nearest-neighbor search, and collection info.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{IndexError, Result};
use crate::{CollectionInfo, EventPoint, ScoredPoint, SearchFilter, VectorIndex};

/// Default Qdrant REST endpoint.
const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the Qdrant client.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// Base URL of the Qdrant server.
    pub url: String,

    /// Collection to operate on.
    pub collection: String,

    /// Optional API key.
    pub api_key: Option<String>,

    /// Request timeout.
    pub timeout: Duration,
}

impl QdrantConfig {
    /// Create a new config for the given collection.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            collection: collection.into(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the server URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set an API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    points: Vec<QdrantPoint>,
}

#[derive(Debug, Serialize)]
struct QdrantPoint {
    id: u64,
    vector: Vec<f32>,
    payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct SearchRequest {
    vector: Vec<f32>,
    limit: usize,
    with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<QdrantFilter>,
}

#[derive(Debug, Serialize)]
struct QdrantFilter {
    must: Vec<QdrantCondition>,
}

#[derive(Debug, Serialize)]
struct QdrantCondition {
    key: String,
    r#match: QdrantMatch,
}

#[derive(Debug, Serialize)]
struct QdrantMatch {
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    score: f32,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    result: CollectionResult,
}

#[derive(Debug, Deserialize)]
struct CollectionResult {
    #[serde(default)]
    points_count: u64,
    status: String,
}

/// Translate a [`SearchFilter`] into Qdrant's must/match representation.
fn to_qdrant_filter(filter: &SearchFilter) -> Option<QdrantFilter> {
    if filter.is_empty() {
        return None;
    }

    Some(QdrantFilter {
        must: filter
            .conditions()
            .iter()
            .map(|(key, value)| QdrantCondition {
                key: key.clone(),
                r#match: QdrantMatch {
                    value: value.clone(),
                },
            })
            .collect(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Qdrant Index
// ─────────────────────────────────────────────────────────────────────────────

/// Qdrant-backed vector index.
pub struct QdrantIndex {
    client: Client,
    config: QdrantConfig,
}

impl QdrantIndex {
    /// Create a new Qdrant client.
    pub fn new(config: QdrantConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IndexError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.config.url, self.config.collection)
    }

    /// Add the API key header when configured.
    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.config.api_key {
            builder.header("api-key", key)
        } else {
            builder
        }
    }

    /// Convert a non-success response into an [`IndexError`].
    async fn error_from_response(&self, response: reqwest::Response) -> IndexError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::NOT_FOUND {
            IndexError::CollectionNotFound(self.config.collection.clone())
        } else {
            IndexError::Backend(format!("HTTP {} - {}", status, body))
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        // Probe first so an existing collection is left untouched.
        let probe = self
            .add_headers(self.client.get(self.collection_url()))
            .send()
            .await?;

        if probe.status().is_success() {
            debug!(collection = %self.config.collection, "Collection already exists");
            return Ok(());
        }
        if probe.status() != StatusCode::NOT_FOUND {
            return Err(self.error_from_response(probe).await);
        }

        let response = self
            .add_headers(self.client.put(self.collection_url()))
            .json(&CreateCollectionRequest {
                vectors: VectorParams {
                    size: dimensions,
                    distance: "Cosine",
                },
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        info!(
            collection = %self.config.collection,
            dimensions,
            "Created collection"
        );
        Ok(())
    }

    async fn upsert(&self, points: Vec<EventPoint>) -> Result<()> {
        let count = points.len();
        let request = UpsertRequest {
            points: points
                .into_iter()
                .map(|p| QdrantPoint {
                    id: p.id,
                    vector: p.vector,
                    payload: p.payload,
                })
                .collect(),
        };

        let response = self
            .add_headers(
                self.client
                    .put(format!("{}/points?wait=true", self.collection_url())),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        debug!(collection = %self.config.collection, count, "Upserted points");
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<ScoredPoint>> {
        let request = SearchRequest {
            vector: vector.to_vec(),
            limit,
            with_payload: true,
            filter: filter.and_then(to_qdrant_filter),
        };

        let response = self
            .add_headers(
                self.client
                    .post(format!("{}/points/search", self.collection_url())),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Serialization(format!("Failed to parse response: {}", e)))?;

        Ok(parsed
            .result
            .into_iter()
            .map(|hit| ScoredPoint {
                score: hit.score,
                payload: hit.payload,
            })
            .collect())
    }

    async fn collection_info(&self) -> Result<CollectionInfo> {
        let response = self
            .add_headers(self.client.get(self.collection_url()))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let parsed: CollectionResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Serialization(format!("Failed to parse response: {}", e)))?;

        Ok(CollectionInfo {
            points_count: parsed.result.points_count,
            status: parsed.result.status,
        })
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
