use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: NaiveDateTime,
    pub summary: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub processed: bool,
}

/// A candidate article as returned by the headline source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: NaiveDateTime,
}

impl NewArticle {
    pub fn from_headline(headline: Headline, published_at: NaiveDateTime) -> Self {
        Self {
            title: headline.title,
            description: headline.description,
            url: headline.url,
            published_at,
        }
    }
}

/// Row awaiting a summary (`processed = 0`).
#[derive(Debug, Clone)]
pub struct PendingSummary {
    pub id: i64,
    pub description: String,
}

/// Row with a summary but no sentiment label yet.
#[derive(Debug, Clone)]
pub struct PendingSentiment {
    pub id: i64,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    /// Binary mapping of a compound polarity score. Zero is not positive.
    pub fn from_compound(compound: f64) -> Self {
        if compound > 0.0 {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
        }
    }

    /// CSS class used by the report.
    pub fn css_class(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSITIVE" => Ok(Sentiment::Positive),
            "NEGATIVE" => Ok(Sentiment::Negative),
            other => Err(AppError::InvalidSentiment(other.to_string())),
        }
    }
}

impl ToSql for Sentiment {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Sentiment {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: AppError| FromSqlError::Other(Box::new(e)))
    }
}

/// Committed mutation on the article store, published to the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleChange {
    Inserted(usize),
    Summarized(usize),
    Scored(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_boundary_maps_zero_to_negative() {
        assert_eq!(Sentiment::from_compound(0.0), Sentiment::Negative);
        assert_eq!(Sentiment::from_compound(-0.0), Sentiment::Negative);
        assert_eq!(Sentiment::from_compound(-0.42), Sentiment::Negative);
        assert_eq!(Sentiment::from_compound(f64::MIN_POSITIVE), Sentiment::Positive);
        assert_eq!(Sentiment::from_compound(0.6), Sentiment::Positive);
    }

    #[test]
    fn labels_parse_strictly() {
        assert_eq!("POSITIVE".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("NEGATIVE".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert!("NEUTRAL".parse::<Sentiment>().is_err());
        assert!("positive".parse::<Sentiment>().is_err());
    }
}
