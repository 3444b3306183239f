//! Shared application state.
//!
//! The pipeline and its collaborators are built eagerly at startup. An
//! initialization failure does not abort the server: the failure reason
//! is stored and reported by `/health`, and `/recommend` answers 503
//! until the process is restarted with a working configuration.

use std::sync::Arc;

use tracing::{error, info};

use uptown_config::Settings;
use uptown_index::{QdrantConfig, QdrantIndex, SharedVectorIndex};
use uptown_llm::{
    OpenAiBackend, OpenAiConfig, OpenAiEmbedder, OpenAiEmbedderConfig, SharedChatBackend,
    SharedEmbedder,
};
use uptown_pipeline::{RecommendPipeline, ResultCache};

use crate::error::{Result, ServerError};

/// The initialized pipeline with the collaborators the health surface
/// probes directly.
pub struct PipelineHandles {
    pub pipeline: RecommendPipeline,
    pub backend: SharedChatBackend,
    pub index: SharedVectorIndex,
}

struct AppStateInner {
    pipeline: std::result::Result<PipelineHandles, String>,
    cache: ResultCache,
    settings: Settings,
}

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    /// Build the state from settings, initializing the pipeline eagerly.
    ///
    /// Initialization failure is captured, not propagated: the server
    /// still starts and reports the failure through its endpoints.
    pub fn initialize(settings: Settings) -> Self {
        let cache = ResultCache::new(settings.cache_capacity, settings.cache_ttl);

        let pipeline = match build_pipeline(&settings) {
            Ok(handles) => {
                info!("Pipeline initialized");
                Ok(handles)
            }
            Err(e) => {
                let reason = e.to_string();
                error!(error = %reason, "Pipeline initialization failed");
                Err(reason)
            }
        };

        Self {
            inner: Arc::new(AppStateInner {
                pipeline,
                cache,
                settings,
            }),
        }
    }

    /// Build state around pre-constructed collaborators. Used by tests
    /// with mock backends.
    pub fn with_components(
        backend: SharedChatBackend,
        embedder: SharedEmbedder,
        index: SharedVectorIndex,
        settings: Settings,
    ) -> Self {
        let cache = ResultCache::new(settings.cache_capacity, settings.cache_ttl);
        let pipeline = RecommendPipeline::new(backend.clone(), embedder, index.clone())
            .with_response_sampling(settings.llm_temperature, settings.llm_max_tokens);

        Self {
            inner: Arc::new(AppStateInner {
                pipeline: Ok(PipelineHandles {
                    pipeline,
                    backend,
                    index,
                }),
                cache,
                settings,
            }),
        }
    }

    /// Build state representing a failed initialization.
    pub fn failed(reason: impl Into<String>, settings: Settings) -> Self {
        let cache = ResultCache::new(settings.cache_capacity, settings.cache_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                pipeline: Err(reason.into()),
                cache,
                settings,
            }),
        }
    }

    /// The pipeline, or a 503-mapped error carrying the stored
    /// initialization failure.
    pub fn pipeline(&self) -> Result<&PipelineHandles> {
        self.inner
            .pipeline
            .as_ref()
            .map_err(|reason| ServerError::ServiceUnavailable(reason.clone()))
    }

    /// The stored initialization failure, if any.
    pub fn init_failure(&self) -> Option<&str> {
        self.inner.pipeline.as_ref().err().map(String::as_str)
    }

    /// The result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.inner.cache
    }

    /// The settings this state was built from.
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }
}

/// Construct the live OpenAI + Qdrant pipeline from settings.
fn build_pipeline(settings: &Settings) -> Result<PipelineHandles> {
    let api_key = settings
        .require_api_key()
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let mut llm_config = OpenAiConfig::openai(api_key).with_model(&settings.llm_model);
    let mut embedder_config =
        OpenAiEmbedderConfig::new(api_key).with_model(&settings.embedding_model);
    if let Some(ref base_url) = settings.openai_base_url {
        llm_config = llm_config.with_base_url(base_url);
        embedder_config = embedder_config.with_base_url(base_url);
    }

    let backend: SharedChatBackend = Arc::new(
        OpenAiBackend::new(llm_config).map_err(|e| ServerError::Internal(e.to_string()))?,
    );
    let embedder: SharedEmbedder = Arc::new(
        OpenAiEmbedder::new(embedder_config).map_err(|e| ServerError::Internal(e.to_string()))?,
    );
    let index: SharedVectorIndex = Arc::new(
        QdrantIndex::new(
            QdrantConfig::new(&settings.collection_name).with_url(&settings.qdrant_url),
        )
        .map_err(|e| ServerError::Internal(e.to_string()))?,
    );

    let pipeline = RecommendPipeline::new(backend.clone(), embedder, index.clone())
        .with_response_sampling(settings.llm_temperature, settings.llm_max_tokens);

    Ok(PipelineHandles {
        pipeline,
        backend,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uptown_index::MemoryIndex;
    use uptown_llm::{MockBackend, MockEmbedder};

    #[test]
    fn test_with_components_pipeline_available() {
        let state = AppState::with_components(
            Arc::new(MockBackend::new(vec![])),
            Arc::new(MockEmbedder::new(16)),
            Arc::new(MemoryIndex::new()),
            Settings::default(),
        );

        assert!(state.pipeline().is_ok());
        assert!(state.init_failure().is_none());
    }

    #[test]
    fn test_failed_state_serves_503() {
        let state = AppState::failed("no API key", Settings::default());

        assert!(matches!(
            state.pipeline(),
            Err(ServerError::ServiceUnavailable(_))
        ));
        assert_eq!(state.init_failure(), Some("no API key"));
    }

    #[test]
    fn test_initialize_without_api_key_stores_failure() {
        let settings = Settings {
            openai_api_key: None,
            ..Default::default()
        };
        let state = AppState::initialize(settings);

        assert!(state.init_failure().is_some());
    }
}
