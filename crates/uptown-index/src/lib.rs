//! Vector index client for Uptown event search.
//!
//! The recommendation pipeline treats the vector database as an opaque
//! collaborator: it can create a collection, upsert points with a JSON
//! payload, and run nearest-neighbor searches optionally constrained by
//! equality conditions on payload fields.
//!
//! Two implementations are provided:
//!
//! - [`QdrantIndex`]: talks to a Qdrant server over its REST API
//! - [`MemoryIndex`]: in-memory cosine-similarity index for tests and
//!   offline development

pub mod error;
pub mod memory;
pub mod qdrant;

pub use error::{IndexError, Result};
pub use memory::MemoryIndex;
pub use qdrant::{QdrantConfig, QdrantIndex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Data Types
// ─────────────────────────────────────────────────────────────────────────────

/// A point to be stored in the index: an id, its embedding, and an
/// arbitrary JSON payload carried alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPoint {
    /// Point identifier. Re-upserting an id overwrites the stored point.
    pub id: u64,
    /// Embedding vector.
    pub vector: Vec<f32>,
    /// Payload returned verbatim from searches.
    pub payload: serde_json::Value,
}

/// A search hit: the stored payload with its similarity score.
///
/// Scores are in the index's native range (cosine similarity here);
/// higher means more relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Similarity score from the index.
    pub score: f32,
    /// The stored payload.
    pub payload: serde_json::Value,
}

/// Statistics about a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Number of points stored.
    pub points_count: u64,
    /// Backend-reported status string (e.g. "green").
    pub status: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Search Filter
// ─────────────────────────────────────────────────────────────────────────────

/// An equality-conjunction predicate over point payloads.
///
/// Each condition requires the payload field to match the value exactly;
/// conditions are ANDed. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    conditions: Vec<(String, serde_json::Value)>,
}

impl SearchFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition on a payload field.
    pub fn must_match(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    /// Returns true if no conditions are present.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The equality conditions, in insertion order.
    pub fn conditions(&self) -> &[(String, serde_json::Value)] {
        &self.conditions
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vector Index Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for vector index backends.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if it does not exist yet.
    async fn ensure_collection(&self, dimensions: usize) -> Result<()>;

    /// Insert or overwrite points.
    async fn upsert(&self, points: Vec<EventPoint>) -> Result<()>;

    /// Nearest-neighbor search, bounded by `limit` and optionally
    /// constrained by an equality filter.
    ///
    /// Results are ordered by descending similarity. Returning fewer than
    /// `limit` hits (including zero) is a valid, non-error result.
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<ScoredPoint>>;

    /// Collection statistics, used by the health surface.
    async fn collection_info(&self) -> Result<CollectionInfo>;

    /// Get the name of this index backend.
    fn name(&self) -> &str;
}

/// A vector index that can be shared across threads.
pub type SharedVectorIndex = Arc<dyn VectorIndex>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filter_builder() {
        let filter = SearchFilter::new()
            .must_match("is_free", true)
            .must_match("indoor_or_outdoor", "outdoor");

        assert!(!filter.is_empty());
        assert_eq!(filter.conditions().len(), 2);
        assert_eq!(filter.conditions()[0].0, "is_free");
        assert_eq!(filter.conditions()[0].1, serde_json::Value::Bool(true));
        assert_eq!(filter.conditions()[1].1, serde_json::json!("outdoor"));
    }

    #[test]
    fn test_search_filter_empty() {
        assert!(SearchFilter::new().is_empty());
    }
}
