//! In-memory vector index.
//!
//! Backs tests and offline development with the same search semantics as
//! the remote index: cosine similarity scoring, descending order, and
//! equality filtering on payload fields.

use async_trait::async_trait;
use parking_lot::Mutex;

use uptown_llm::cosine_similarity;

use crate::error::Result;
use crate::{CollectionInfo, EventPoint, ScoredPoint, SearchFilter, VectorIndex};

/// In-memory cosine-similarity index.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    points: Mutex<Vec<EventPoint>>,
}

impl MemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points stored.
    pub fn len(&self) -> usize {
        self.points.lock().len()
    }

    /// Returns true if the index holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.lock().is_empty()
    }
}

/// Check whether a payload satisfies every condition of a filter.
fn matches_filter(payload: &serde_json::Value, filter: &SearchFilter) -> bool {
    filter
        .conditions()
        .iter()
        .all(|(key, value)| payload.get(key) == Some(value))
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_collection(&self, _dimensions: usize) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, points: Vec<EventPoint>) -> Result<()> {
        let mut stored = self.points.lock();
        for point in points {
            if let Some(existing) = stored.iter_mut().find(|p| p.id == point.id) {
                *existing = point;
            } else {
                stored.push(point);
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<ScoredPoint>> {
        let stored = self.points.lock();

        let mut hits: Vec<ScoredPoint> = stored
            .iter()
            .filter(|p| filter.is_none_or(|f| matches_filter(&p.payload, f)))
            .map(|p| ScoredPoint {
                score: cosine_similarity(vector, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);

        Ok(hits)
    }

    async fn collection_info(&self) -> Result<CollectionInfo> {
        Ok(CollectionInfo {
            points_count: self.points.lock().len() as u64,
            status: "green".to_string(),
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(id: u64, vector: Vec<f32>, payload: serde_json::Value) -> EventPoint {
        EventPoint {
            id,
            vector,
            payload,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_search_orders_by_similarity() {
        let index = MemoryIndex::new();
        index
            .upsert(vec![
                point(0, vec![1.0, 0.0], json!({"title": "exact"})),
                point(1, vec![0.0, 1.0], json!({"title": "orthogonal"})),
                point(2, vec![0.7, 0.7], json!({"title": "diagonal"})),
            ])
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 10, None).await.unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].payload["title"], "exact");
        assert_eq!(hits[1].payload["title"], "diagonal");
        assert_eq!(hits[2].payload["title"], "orthogonal");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let index = MemoryIndex::new();
        index
            .upsert(vec![
                point(0, vec![1.0, 0.0], json!({})),
                point(1, vec![0.9, 0.1], json!({})),
                point(2, vec![0.8, 0.2], json!({})),
            ])
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 2, None).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let index = MemoryIndex::new();
        index
            .upsert(vec![point(0, vec![1.0, 0.0], json!({"v": 1}))])
            .await
            .unwrap();
        index
            .upsert(vec![point(0, vec![1.0, 0.0], json!({"v": 2}))])
            .await
            .unwrap();

        assert_eq!(index.len(), 1);
        let hits = index.search(&[1.0, 0.0], 10, None).await.unwrap();
        assert_eq!(hits[0].payload["v"], 2);
    }

    #[tokio::test]
    async fn test_equality_filter_conjunction() {
        let index = MemoryIndex::new();
        index
            .upsert(vec![
                point(
                    0,
                    vec![1.0, 0.0],
                    json!({"is_free": true, "indoor_or_outdoor": "outdoor"}),
                ),
                point(
                    1,
                    vec![1.0, 0.0],
                    json!({"is_free": true, "indoor_or_outdoor": "indoor"}),
                ),
                point(
                    2,
                    vec![1.0, 0.0],
                    json!({"is_free": false, "indoor_or_outdoor": "outdoor"}),
                ),
            ])
            .await
            .unwrap();

        let filter = SearchFilter::new()
            .must_match("is_free", true)
            .must_match("indoor_or_outdoor", "outdoor");
        let hits = index.search(&[1.0, 0.0], 10, Some(&filter)).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload["indoor_or_outdoor"], "outdoor");
        assert_eq!(hits[0].payload["is_free"], true);
    }

    #[tokio::test]
    async fn test_filter_matching_nothing_is_empty_not_error() {
        let index = MemoryIndex::new();
        index
            .upsert(vec![point(0, vec![1.0, 0.0], json!({"is_free": false}))])
            .await
            .unwrap();

        let filter = SearchFilter::new().must_match("is_free", true);
        let hits = index.search(&[1.0, 0.0], 10, Some(&filter)).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_index_search() {
        let index = MemoryIndex::new();
        let hits = index.search(&[1.0, 0.0], 10, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_collection_info() {
        let index = MemoryIndex::new();
        index
            .upsert(vec![point(0, vec![1.0], json!({}))])
            .await
            .unwrap();

        let info = index.collection_info().await.unwrap();
        assert_eq!(info.points_count, 1);
        assert_eq!(info.status, "green");
    }
}
