use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::feed::NewsApiClient;
use crate::nlp::{LexiconAnalyzer, LsaSummarizer};
use crate::pipeline::{
    run_on_change, run_on_schedule, IngestStage, SentimentStage, Stage, SummarizeStage,
};
use crate::web;

/// Rows written by a one-shot pass through all three stages.
#[derive(Debug, Default)]
pub struct RunReport {
    pub ingested: usize,
    pub summarized: usize,
    pub scored: usize,
}

pub struct App {
    config: Config,
    repository: Arc<Repository>,
    ingest: Arc<IngestStage>,
    summarize: Arc<SummarizeStage>,
    sentiment: Arc<SentimentStage>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let repository = Arc::new(Repository::open(&config.database_url).await?);

        let source = Arc::new(NewsApiClient::new(
            &config.news_api_base_url,
            &config.news_api_key,
            &config.country,
        )?);
        let ingest = Arc::new(IngestStage::new(source, repository.clone()));
        let summarize = Arc::new(SummarizeStage::new(
            repository.clone(),
            Arc::new(LsaSummarizer::new(config.summary_sentences)),
        ));
        let sentiment = Arc::new(SentimentStage::new(
            repository.clone(),
            Arc::new(LexiconAnalyzer::new()),
        ));

        Ok(Self {
            config,
            repository,
            ingest,
            summarize,
            sentiment,
        })
    }

    /// Ingests once, then drains both enrichment stages.
    pub async fn run_once(&self) -> Result<RunReport> {
        let ingested = self.ingest.run().await?;
        let summarized = self.summarize.run().await?;
        let scored = self.sentiment.run().await?;
        Ok(RunReport {
            ingested,
            summarized,
            scored,
        })
    }

    /// Serves the report and drives the pipeline until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let poll = self.config.enrich_poll();

        let workers = vec![
            tokio::spawn(run_on_schedule(
                self.ingest.clone(),
                self.config.ingest_interval(),
                self.config.run_on_startup,
                stop_rx.clone(),
            )),
            tokio::spawn(run_on_change(
                self.summarize.clone(),
                self.repository.subscribe(),
                poll,
                stop_rx.clone(),
            )),
            tokio::spawn(run_on_change(
                self.sentiment.clone(),
                self.repository.subscribe(),
                poll,
                stop_rx,
            )),
        ];

        let listener = TcpListener::bind(self.config.bind_addr.as_str()).await?;
        info!(addr = %self.config.bind_addr, "Listening");

        axum::serve(listener, web::router(self.repository.clone()))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        stop_tx.send(true).ok();
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "Pipeline worker ended abnormally");
            }
        }

        info!("Shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown"),
        _ = terminate => info!("Received SIGTERM, starting shutdown"),
    }
}
