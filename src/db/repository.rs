use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tokio::sync::broadcast;
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Article, ArticleChange, NewArticle, PendingSentiment, PendingSummary, Sentiment};

use super::schema::{SCHEMA, TIMESTAMP_FORMAT};

const CHANGE_FEED_CAPACITY: usize = 64;

const ARTICLE_COLUMNS: &str = "article_id, title, description, url, published_date, summary, sentiment, processed";

pub struct Repository {
    conn: Connection,
    changes: broadcast::Sender<ArticleChange>,
}

impl Repository {
    /// Opens the store named by a connection string: a SQLite path,
    /// `sqlite://path`, `sqlite:path` or `:memory:`.
    pub async fn open(database_url: &str) -> Result<Self> {
        let path = database_path(database_url);
        let conn = if path == ":memory:" {
            Connection::open_in_memory().await?
        } else {
            Connection::open(path).await?
        };

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Ok(Self { conn, changes })
    }

    /// Subscribes to committed writes. This is the change trigger for the enrichment stages.
    pub fn subscribe(&self) -> broadcast::Receiver<ArticleChange> {
        self.changes.subscribe()
    }

    fn publish(&self, change: ArticleChange) {
        // No subscribers is fine (e.g. the one-shot CLI mode).
        self.changes.send(change).ok();
    }

    // Ingestion

    /// Inserts every article in one transaction. Nothing is persisted on error.
    pub async fn insert_articles(&self, articles: Vec<NewArticle>) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO articles (title, description, url, published_date) VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for article in &articles {
                        stmt.execute(params![
                            article.title,
                            article.description,
                            article.url,
                            article.published_at.format(TIMESTAMP_FORMAT).to_string(),
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(articles.len())
            })
            .await?;

        self.publish(ArticleChange::Inserted(inserted));
        Ok(inserted)
    }

    // Summarization

    pub async fn pending_summaries(&self) -> Result<Vec<PendingSummary>> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT article_id, description FROM articles WHERE processed = 0 ORDER BY article_id",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(PendingSummary {
                            id: row.get(0)?,
                            description: row.get(1)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }

    /// Stores summaries and marks the rows processed, all in one transaction.
    /// Rows already processed by someone else are left untouched and not counted.
    pub async fn save_summaries(&self, summaries: Vec<(i64, String)>) -> Result<usize> {
        if summaries.is_empty() {
            return Ok(0);
        }

        let updated = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut updated = 0;
                {
                    let mut stmt = tx.prepare(
                        "UPDATE articles SET summary = ?1, processed = 1 WHERE article_id = ?2 AND processed = 0",
                    )?;
                    for (id, summary) in &summaries {
                        updated += stmt.execute(params![summary, id])?;
                    }
                }
                tx.commit()?;
                Ok(updated)
            })
            .await?;

        if updated > 0 {
            self.publish(ArticleChange::Summarized(updated));
        }
        Ok(updated)
    }

    // Sentiment

    pub async fn pending_sentiments(&self) -> Result<Vec<PendingSentiment>> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT article_id, summary FROM articles WHERE sentiment IS NULL AND summary IS NOT NULL ORDER BY article_id",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(PendingSentiment {
                            id: row.get(0)?,
                            summary: row.get(1)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }

    /// Stores sentiment labels in one transaction. A label is never overwritten.
    pub async fn save_sentiments(&self, labels: Vec<(i64, Sentiment)>) -> Result<usize> {
        if labels.is_empty() {
            return Ok(0);
        }

        let updated = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut updated = 0;
                {
                    let mut stmt = tx.prepare(
                        "UPDATE articles SET sentiment = ?1 WHERE article_id = ?2 AND sentiment IS NULL",
                    )?;
                    for (id, sentiment) in &labels {
                        updated += stmt.execute(params![sentiment, id])?;
                    }
                }
                tx.commit()?;
                Ok(updated)
            })
            .await?;

        if updated > 0 {
            self.publish(ArticleChange::Scored(updated));
        }
        Ok(updated)
    }

    // Query

    /// Fully enriched articles published on `date`, in insertion order.
    pub async fn enriched_on(&self, date: NaiveDate) -> Result<Vec<Article>> {
        let day = date.format("%Y-%m-%d").to_string();
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {ARTICLE_COLUMNS}
                       FROM articles
                       WHERE date(published_date) = ?1
                         AND summary IS NOT NULL
                         AND sentiment IS NOT NULL
                       ORDER BY article_id"#
                ))?;
                let articles = stmt
                    .query_map(params![day], article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    #[cfg(test)]
    pub async fn get_article(&self, id: i64) -> Result<Option<Article>> {
        use rusqlite::OptionalExtension;

        let article = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles WHERE article_id = ?1"
                ))?;
                let article = stmt.query_row(params![id], article_from_row).optional()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    #[cfg(test)]
    pub async fn execute_batch(&self, sql: &'static str) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute_batch(sql)?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

fn database_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    let published: String = row.get(4)?;
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        url: row.get(3)?,
        published_at: parse_timestamp(4, &published)?,
        summary: row.get(5)?,
        sentiment: row.get(6)?,
        processed: row.get::<_, i64>(7)? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, Timelike};

    fn new_article(title: &str, published_at: NaiveDateTime) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            description: format!("{title} description."),
            url: format!("https://example.com/{}", title.to_lowercase()),
            published_at,
        }
    }

    async fn memory_repo() -> Repository {
        Repository::open(":memory:").await.unwrap()
    }

    #[test]
    fn connection_string_prefixes_are_stripped() {
        assert_eq!(database_path("sqlite://data/news.db"), "data/news.db");
        assert_eq!(database_path("sqlite:news.db"), "news.db");
        assert_eq!(database_path("/var/lib/news.db"), "/var/lib/news.db");
        assert_eq!(database_path(":memory:"), ":memory:");
    }

    #[tokio::test]
    async fn inserted_rows_start_unprocessed() {
        let repo = memory_repo().await;
        let now = Local::now().naive_local();
        let inserted = repo
            .insert_articles(vec![new_article("Alpha", now), new_article("Beta", now)])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        for id in [1, 2] {
            let article = repo.get_article(id).await.unwrap().unwrap();
            assert!(!article.processed);
            assert!(article.summary.is_none());
            assert!(article.sentiment.is_none());
        }
        assert_eq!(repo.pending_summaries().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_urls_are_kept() {
        let repo = memory_repo().await;
        let now = Local::now().naive_local();
        repo.insert_articles(vec![new_article("Same", now)]).await.unwrap();
        repo.insert_articles(vec![new_article("Same", now)]).await.unwrap();
        assert!(repo.get_article(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn summary_is_written_once() {
        let repo = memory_repo().await;
        let now = Local::now().naive_local();
        repo.insert_articles(vec![new_article("Alpha", now)]).await.unwrap();

        let first = repo.save_summaries(vec![(1, "First.".to_string())]).await.unwrap();
        let second = repo.save_summaries(vec![(1, "Second.".to_string())]).await.unwrap();
        assert_eq!((first, second), (1, 0));

        let article = repo.get_article(1).await.unwrap().unwrap();
        assert!(article.processed);
        assert_eq!(article.summary.as_deref(), Some("First."));
        assert!(repo.pending_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sentiment_is_written_once() {
        let repo = memory_repo().await;
        let now = Local::now().naive_local();
        repo.insert_articles(vec![new_article("Alpha", now)]).await.unwrap();
        assert!(repo.pending_sentiments().await.unwrap().is_empty());

        repo.save_summaries(vec![(1, "Fine.".to_string())]).await.unwrap();
        assert_eq!(repo.pending_sentiments().await.unwrap().len(), 1);

        repo.save_sentiments(vec![(1, Sentiment::Positive)]).await.unwrap();
        let again = repo.save_sentiments(vec![(1, Sentiment::Negative)]).await.unwrap();
        assert_eq!(again, 0);

        let article = repo.get_article(1).await.unwrap().unwrap();
        assert_eq!(article.sentiment, Some(Sentiment::Positive));
        assert!(repo.pending_sentiments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn processed_without_summary_violates_schema() {
        let repo = memory_repo().await;
        let now = Local::now().naive_local();
        repo.insert_articles(vec![new_article("Alpha", now)]).await.unwrap();

        let result = repo
            .execute_batch("UPDATE articles SET processed = 1 WHERE article_id = 1")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn enriched_on_filters_by_date_and_fields() {
        let repo = memory_repo().await;
        let now = Local::now().naive_local();
        let yesterday = now - Duration::days(1);
        repo.insert_articles(vec![
            new_article("Complete", now),
            new_article("NoSentiment", now),
            new_article("NoSummary", now),
            new_article("Yesterday", yesterday),
        ])
        .await
        .unwrap();

        repo.save_summaries(vec![
            (1, "One.".to_string()),
            (2, "Two.".to_string()),
            (4, "Four.".to_string()),
        ])
        .await
        .unwrap();
        repo.save_sentiments(vec![(1, Sentiment::Negative), (4, Sentiment::Positive)])
            .await
            .unwrap();

        let today = repo.enriched_on(now.date()).await.unwrap();
        let titles: Vec<_> = today.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Complete"]);

        let previous = repo.enriched_on(yesterday.date()).await.unwrap();
        assert_eq!(previous.len(), 1);
        assert_eq!(previous[0].title, "Yesterday");
    }

    #[tokio::test]
    async fn committed_writes_are_published() {
        let repo = memory_repo().await;
        let mut changes = repo.subscribe();
        let now = Local::now().naive_local();

        repo.insert_articles(vec![new_article("Alpha", now)]).await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), ArticleChange::Inserted(1));

        repo.save_summaries(vec![(1, "Done.".to_string())]).await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), ArticleChange::Summarized(1));

        // No-op updates stay silent.
        repo.save_summaries(vec![(1, "Again.".to_string())]).await.unwrap();
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("news.db").display());
        let now = Local::now().naive_local();

        {
            let repo = Repository::open(&url).await.unwrap();
            repo.insert_articles(vec![new_article("Kept", now)]).await.unwrap();
        }

        let repo = Repository::open(&url).await.unwrap();
        let article = repo.get_article(1).await.unwrap().unwrap();
        assert_eq!(article.title, "Kept");
        assert_eq!(article.published_at, now.with_nanosecond(0).unwrap());
    }
}
