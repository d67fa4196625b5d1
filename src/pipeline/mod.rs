//! The three enrichment stages and the triggers that drive them.
//!
//! Ingestion runs on a fixed schedule. Summarization and sentiment scoring
//! react to the store's change feed, with a polling fallback.

mod ingest;
mod sentiment;
mod summarize;
mod trigger;

use async_trait::async_trait;

use crate::error::Result;

pub use ingest::IngestStage;
pub use sentiment::SentimentStage;
pub use summarize::SummarizeStage;
pub use trigger::{run_on_change, run_on_schedule};

/// One short-lived invocation of a pipeline stage. Returns the number of rows written.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self) -> Result<usize>;
}
