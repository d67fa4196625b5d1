use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::db::Repository;
use crate::error::Result;
use crate::models::Sentiment;
use crate::nlp::PolarityAnalyzer;

use super::Stage;

/// Labels summarized articles POSITIVE or NEGATIVE.
///
/// Articles whose summary is empty are never labelled. Same commit
/// discipline as summarization: one transaction per invocation.
pub struct SentimentStage {
    repository: Arc<Repository>,
    analyzer: Arc<dyn PolarityAnalyzer>,
}

impl SentimentStage {
    pub fn new(repository: Arc<Repository>, analyzer: Arc<dyn PolarityAnalyzer>) -> Self {
        Self {
            repository,
            analyzer,
        }
    }
}

#[async_trait]
impl Stage for SentimentStage {
    fn name(&self) -> &'static str {
        "sentiment"
    }

    async fn run(&self) -> Result<usize> {
        let pending = self.repository.pending_sentiments().await?;

        let mut labels = Vec::with_capacity(pending.len());
        for row in pending {
            if row.summary.is_empty() {
                debug!(article_id = row.id, "Empty summary, not scored");
                continue;
            }
            match self.analyzer.compound(&row.summary) {
                Ok(compound) => labels.push((row.id, Sentiment::from_compound(compound))),
                Err(e) => warn!(article_id = row.id, error = %e, "Skipping article, sentiment analysis failed"),
            }
        }

        if labels.is_empty() {
            return Ok(0);
        }

        let updated = self.repository.save_sentiments(labels).await?;
        info!(updated, "Scored article sentiment");
        Ok(updated)
    }
}
