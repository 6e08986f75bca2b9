mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::commands::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travelease=info,travelease_store=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = travelease_store::Config::load().context("Failed to load config")?;
    tracing::debug!("Storage backend: {:?}", config.storage.backend);

    let mut app = App::open(config).await?;
    let result = app.run(cli.command).await;
    app.close().await;

    println!("{}", result?);
    Ok(())
}
