use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::db::Repository;
use crate::error::Result;
use crate::nlp::Summarizer;

use super::Stage;

/// Summarizes every unprocessed article and marks it processed.
///
/// Summaries are computed row by row; a row the summarizer rejects is logged
/// and left pending. All successful summaries are committed together, so a
/// database failure leaves the whole batch pending for the next trigger.
pub struct SummarizeStage {
    repository: Arc<Repository>,
    summarizer: Arc<dyn Summarizer>,
}

impl SummarizeStage {
    pub fn new(repository: Arc<Repository>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            repository,
            summarizer,
        }
    }
}

#[async_trait]
impl Stage for SummarizeStage {
    fn name(&self) -> &'static str {
        "summarize"
    }

    async fn run(&self) -> Result<usize> {
        let pending = self.repository.pending_summaries().await?;
        if pending.is_empty() {
            debug!("No unprocessed articles");
            return Ok(0);
        }

        let mut summaries = Vec::with_capacity(pending.len());
        for row in pending {
            match self.summarizer.summarize(&row.description) {
                Ok(summary) => summaries.push((row.id, summary)),
                Err(e) => warn!(article_id = row.id, error = %e, "Skipping article, summarization failed"),
            }
        }

        let updated = self.repository.save_summaries(summaries).await?;
        info!(updated, "Processed new articles and added summaries");
        Ok(updated)
    }
}
