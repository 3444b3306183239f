//! `uptown ask` - one-shot query from the command line.

use anyhow::{Context, Result};
use clap::Args;

use uptown_config::Settings;
use uptown_pipeline::RecommendPipeline;

use super::{build_backend, build_embedder, build_index};

#[derive(Args)]
pub struct AskArgs {
    /// The query to run
    pub query: String,

    /// Number of candidates to retrieve (defaults to MAX_EVENTS_PER_QUERY)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Print the full result as JSON instead of just the response text
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: AskArgs) -> Result<()> {
    let settings = Settings::from_env().context("Failed to load settings")?;

    let pipeline = RecommendPipeline::new(
        build_backend(&settings)?,
        build_embedder(&settings)?,
        build_index(&settings)?,
    )
    .with_response_sampling(settings.llm_temperature, settings.llm_max_tokens);

    let top_k = args.top_k.unwrap_or(settings.max_events_per_query);
    let recommendation = pipeline
        .run(&args.query, top_k)
        .await
        .context("Pipeline run failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        println!("{}", recommendation.response);
    }
    Ok(())
}
