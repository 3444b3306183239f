//! End-to-end recommendation pipeline.
//!
//! Runs the three stages strictly in sequence for each query:
//!
//! ```text
//!   query ──▶ FilterExtractor ──▶ Retriever ──▶ ResponseComposer ──▶ Recommendation
//! ```
//!
//! Extraction failures are absorbed (the search runs unfiltered);
//! retrieval and composition failures abort the run.

use chrono::Utc;
use tracing::info;

use uptown_index::SharedVectorIndex;
use uptown_llm::{SharedChatBackend, SharedEmbedder};

use crate::composer::ResponseComposer;
use crate::error::Result;
use crate::extractor::FilterExtractor;
use crate::retriever::Retriever;
use crate::types::Recommendation;

/// The recommendation pipeline. Stateless between runs; safe to share
/// behind an `Arc`.
pub struct RecommendPipeline {
    extractor: FilterExtractor,
    retriever: Retriever,
    composer: ResponseComposer,
}

impl RecommendPipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        backend: SharedChatBackend,
        embedder: SharedEmbedder,
        index: SharedVectorIndex,
    ) -> Self {
        Self {
            extractor: FilterExtractor::new(backend.clone()),
            retriever: Retriever::new(embedder, index),
            composer: ResponseComposer::new(backend),
        }
    }

    /// Set the sampling temperature and token budget for the response
    /// composition call. Extraction always runs at temperature 0.
    pub fn with_response_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.composer = self
            .composer
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);
        self
    }

    /// Run the pipeline for one query, retrieving up to `limit`
    /// candidates.
    pub async fn run(&self, query: &str, limit: usize) -> Result<Recommendation> {
        let filters = self.extractor.extract(query).await;
        let events = self.retriever.retrieve(query, &filters, limit).await?;
        let response = self.composer.compose(query, &events).await?;

        info!(
            query,
            num_events = events.len(),
            filtered = !filters.is_empty(),
            "Pipeline run complete"
        );

        Ok(Recommendation {
            query: query.to_string(),
            filters,
            events,
            response,
            generated_at: Utc::now(),
        })
    }
}
