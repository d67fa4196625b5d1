mod app;
mod config;
mod db;
mod error;
mod feed;
mod models;
mod nlp;
mod pipeline;
mod web;

use app::App;
use config::Config;
use error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may come from a local .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let app = App::new(config).await?;

    // One pass through the pipeline, then exit
    if args.len() >= 2 && args[1] == "--ingest-once" {
        let report = app.run_once().await?;
        println!(
            "Ingested {} articles, summarized {}, scored {}",
            report.ingested, report.summarized, report.scored
        );
        return Ok(());
    }

    app.run().await
}
