use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use tracing::info;

use crate::db::Repository;
use crate::error::Result;
use crate::feed::HeadlineSource;
use crate::models::NewArticle;

use super::Stage;

/// Pulls the current headlines and stores each one as a new, unprocessed article.
///
/// Every run inserts whatever the source returns; there is no URL
/// deduplication. `published_date` is the ingestion time, shared by every
/// row of a run.
pub struct IngestStage {
    source: Arc<dyn HeadlineSource>,
    repository: Arc<Repository>,
}

impl IngestStage {
    pub fn new(source: Arc<dyn HeadlineSource>, repository: Arc<Repository>) -> Self {
        Self { source, repository }
    }
}

#[async_trait]
impl Stage for IngestStage {
    fn name(&self) -> &'static str {
        "ingest"
    }

    async fn run(&self) -> Result<usize> {
        let headlines = self.source.fetch_headlines().await?;
        let fetched = headlines.len();

        let published_at = Local::now().naive_local();
        let articles: Vec<NewArticle> = headlines
            .into_iter()
            .map(|headline| NewArticle::from_headline(headline, published_at))
            .collect();

        let inserted = self.repository.insert_articles(articles).await?;
        info!(
            source = self.source.source_name(),
            fetched,
            inserted,
            "Ingested top headlines"
        );
        Ok(inserted)
    }
}
