pub const SCHEMA: &str = r#"
-- articles table
CREATE TABLE IF NOT EXISTS articles (
    article_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL,
    published_date TEXT NOT NULL,
    summary TEXT,
    sentiment TEXT CHECK (sentiment IN ('POSITIVE', 'NEGATIVE')),
    processed INTEGER NOT NULL DEFAULT 0,
    CHECK (processed = 0 OR summary IS NOT NULL)
);

CREATE INDEX IF NOT EXISTS idx_articles_processed ON articles(processed);
CREATE INDEX IF NOT EXISTS idx_articles_published_date ON articles(published_date);
"#;

/// Storage format of `published_date`; `date()` in SQLite understands it.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
