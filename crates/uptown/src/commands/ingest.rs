//! `uptown ingest` - embed and upload events into the vector index.
//!
//! Reads a JSON array of events, embeds each title + description pair,
//! creates the collection if needed, and upserts the points. Point ids
//! follow the file order, so re-ingesting the same file overwrites in
//! place.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use uptown_config::Settings;
use uptown_index::{EventPoint, VectorIndex};
use uptown_llm::Embedder;
use uptown_pipeline::Event;

use super::{build_embedder, build_index};

/// Events embedded per batch request.
const EMBED_BATCH_SIZE: usize = 64;

#[derive(Args)]
pub struct IngestArgs {
    /// Path to a JSON file holding an array of events
    #[arg(long)]
    pub file: PathBuf,
}

pub async fn run(args: IngestArgs) -> Result<()> {
    let settings = Settings::from_env().context("Failed to load settings")?;
    let embedder = build_embedder(&settings)?;
    let index = build_index(&settings)?;

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let events: Vec<Event> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    if events.is_empty() {
        println!("No events in {}", args.file.display());
        return Ok(());
    }

    info!(count = events.len(), "Ingesting events");

    index
        .ensure_collection(settings.embedding_dimension)
        .await
        .context("Failed to ensure collection")?;

    let mut points = Vec::with_capacity(events.len());
    for (batch_index, batch) in events.chunks(EMBED_BATCH_SIZE).enumerate() {
        let texts: Vec<String> = batch
            .iter()
            .map(|event| format!("{}. {}", event.title, event.description))
            .collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let embeddings = embedder
            .embed_batch(&text_refs)
            .await
            .context("Embedding failed")?;

        for (offset, (event, vector)) in batch.iter().zip(embeddings).enumerate() {
            points.push(EventPoint {
                id: (batch_index * EMBED_BATCH_SIZE + offset) as u64,
                vector,
                payload: serde_json::to_value(event)?,
            });
        }
    }

    let count = points.len();
    index.upsert(points).await.context("Upsert failed")?;

    println!(
        "Ingested {} events into '{}'",
        count, settings.collection_name
    );
    Ok(())
}
