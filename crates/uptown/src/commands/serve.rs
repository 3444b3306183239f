//! `uptown serve` - run the HTTP API server.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use uptown_config::Settings;
use uptown_server::{AppState, Server};

#[derive(Args)]
pub struct ServeArgs {
    /// Override the bind address (e.g. 127.0.0.1:8000)
    #[arg(long)]
    pub bind: Option<std::net::SocketAddr>,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(bind) = args.bind {
        settings.bind_address = bind;
    }

    info!(
        model = %settings.llm_model,
        collection = %settings.collection_name,
        "Starting server"
    );

    let state = AppState::initialize(settings);
    Server::from_state(state).run().await?;
    Ok(())
}
