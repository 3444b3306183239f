//! Uptown - NYC Event Recommender
//!
//! Main entry point for the Uptown CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ask, ingest, serve};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Uptown - NYC Event Recommender
#[derive(Parser)]
#[command(name = "uptown")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),

    /// Embed and upload events into the vector index
    Ingest(ingest::IngestArgs),

    /// Ask a one-shot question from the command line
    Ask(ask::AskArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "uptown=debug,uptown_pipeline=debug,uptown_llm=debug,uptown_index=debug,uptown_server=debug,info"
    } else {
        "uptown=info,uptown_pipeline=info,uptown_llm=info,uptown_index=info,uptown_server=info,warn"
    };

    let log_dir = std::env::var("UPTOWN_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let file_appender = tracing_appender::rolling::daily(&log_dir, "uptown.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "uptown=trace,uptown_pipeline=trace,uptown_llm=trace,uptown_index=trace,uptown_server=trace,info",
                )),
        )
        .init();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Ingest(args) => ingest::run(args).await,
        Commands::Ask(args) => ask::run(args).await,
    }
}
