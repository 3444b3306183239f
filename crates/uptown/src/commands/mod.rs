//! Command handlers for the Uptown CLI.

pub mod ask;
pub mod ingest;
pub mod serve;

use std::sync::Arc;

use anyhow::{Context, Result};

use uptown_config::Settings;
use uptown_index::{QdrantConfig, QdrantIndex, SharedVectorIndex};
use uptown_llm::{
    OpenAiBackend, OpenAiConfig, OpenAiEmbedder, OpenAiEmbedderConfig, SharedChatBackend,
    SharedEmbedder,
};

/// Build the OpenAI chat backend from settings.
pub fn build_backend(settings: &Settings) -> Result<SharedChatBackend> {
    let api_key = settings.require_api_key()?;
    let mut config = OpenAiConfig::openai(api_key).with_model(&settings.llm_model);
    if let Some(ref base_url) = settings.openai_base_url {
        config = config.with_base_url(base_url);
    }
    Ok(Arc::new(
        OpenAiBackend::new(config).context("Failed to create chat backend")?,
    ))
}

/// Build the OpenAI embedder from settings.
pub fn build_embedder(settings: &Settings) -> Result<SharedEmbedder> {
    let api_key = settings.require_api_key()?;
    let mut config = OpenAiEmbedderConfig::new(api_key).with_model(&settings.embedding_model);
    if let Some(ref base_url) = settings.openai_base_url {
        config = config.with_base_url(base_url);
    }
    Ok(Arc::new(
        OpenAiEmbedder::new(config).context("Failed to create embedder")?,
    ))
}

/// Build the Qdrant index client from settings.
pub fn build_index(settings: &Settings) -> Result<SharedVectorIndex> {
    Ok(Arc::new(
        QdrantIndex::new(
            QdrantConfig::new(&settings.collection_name).with_url(&settings.qdrant_url),
        )
        .context("Failed to create index client")?,
    ))
}
