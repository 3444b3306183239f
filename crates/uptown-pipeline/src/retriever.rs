//! Semantic retrieval of event candidates.
//!
//! Embeds the user query, translates the extracted filters into index
//! equality conditions, and runs the nearest-neighbor search.

use tracing::{debug, warn};

use uptown_index::{SearchFilter, SharedVectorIndex};
use uptown_llm::SharedEmbedder;

use crate::error::Result;
use crate::types::{Event, FilterSet, ScoredEvent};

/// Translate a [`FilterSet`] into index equality conditions.
///
/// Only present fields become conditions; an empty filter set searches
/// the whole collection.
fn to_search_filter(filters: &FilterSet) -> Option<SearchFilter> {
    if filters.is_empty() {
        return None;
    }

    let mut filter = SearchFilter::new();
    if let Some(baby_friendly) = filters.baby_friendly {
        filter = filter.must_match("baby_friendly", baby_friendly);
    }
    if let Some(is_free) = filters.is_free {
        filter = filter.must_match("is_free", is_free);
    }
    if let Some(location) = filters.indoor_or_outdoor {
        filter = filter.must_match("indoor_or_outdoor", location.as_str());
    }
    Some(filter)
}

/// Retrieves scored event candidates for a query.
pub struct Retriever {
    embedder: SharedEmbedder,
    index: SharedVectorIndex,
}

impl Retriever {
    /// Create a new retriever over an embedder and a vector index.
    pub fn new(embedder: SharedEmbedder, index: SharedVectorIndex) -> Self {
        Self { embedder, index }
    }

    /// Retrieve up to `limit` candidates for a query, constrained by the
    /// extracted filters.
    ///
    /// Zero results is a valid outcome, not an error. Individual hits
    /// whose payload does not decode as an [`Event`] are skipped with a
    /// warning.
    pub async fn retrieve(
        &self,
        query: &str,
        filters: &FilterSet,
        limit: usize,
    ) -> Result<Vec<ScoredEvent>> {
        let vector = self.embedder.embed(query).await?;
        let filter = to_search_filter(filters);

        let hits = self
            .index
            .search(&vector, limit, filter.as_ref())
            .await?;

        let mut events = Vec::with_capacity(hits.len());
        for hit in hits {
            match serde_json::from_value::<Event>(hit.payload) {
                Ok(event) => events.push(ScoredEvent {
                    event,
                    score: hit.score,
                }),
                Err(e) => {
                    warn!(error = %e, "Skipping hit with undecodable payload");
                }
            }
        }

        debug!(query, count = events.len(), "Retrieved candidates");
        Ok(events)
    }
}
