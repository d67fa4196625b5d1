use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Headline;

/// Anything that can produce the current batch of candidate headlines.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn fetch_headlines(&self) -> Result<Vec<Headline>>;

    fn source_name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopHeadlinesResponse {
    status: String,
    #[serde(default)]
    articles: Vec<ApiArticle>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

pub struct NewsApiClient {
    client: Client,
    endpoint: Url,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: &str, country: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("headline-digest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let endpoint = Url::parse_with_params(
            &format!("{}/top-headlines", base_url.trim_end_matches('/')),
            &[("country", country), ("apiKey", api_key)],
        )
        .map_err(|e| AppError::Config(format!("invalid news_api_base_url: {e}")))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    async fn fetch_headlines(&self) -> Result<Vec<Headline>> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }

        parse_headlines(&bytes)
    }

    fn source_name(&self) -> &str {
        "newsapi"
    }
}

/// Decodes a `top-headlines` body. Any article missing a title or url makes
/// the whole response invalid.
pub(crate) fn parse_headlines(body: &[u8]) -> Result<Vec<Headline>> {
    let response: TopHeadlinesResponse = serde_json::from_slice(body)?;

    if response.status != "ok" {
        return Err(AppError::NewsApi(format!(
            "{}: {}",
            response.code.unwrap_or_else(|| response.status.clone()),
            response.message.unwrap_or_default()
        )));
    }

    response
        .articles
        .into_iter()
        .enumerate()
        .map(|(i, article)| {
            let title = article
                .title
                .ok_or_else(|| AppError::NewsApi(format!("article {i} has no title")))?;
            let url = article
                .url
                .ok_or_else(|| AppError::NewsApi(format!("article {i} has no url")))?;
            Ok(Headline {
                title,
                description: article.description.unwrap_or_default(),
                url,
            })
        })
        .collect()
}

/// NewsAPI reports failures in the body as well as the status line.
fn status_error(status: StatusCode, body: &[u8]) -> AppError {
    let detail = serde_json::from_slice::<TopHeadlinesResponse>(body)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_default();
    anyhow::anyhow!("Failed to fetch headlines: HTTP {status}: {detail}").into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_keeps_status_and_message() {
        let body = br#"{"status": "error", "code": "apiKeyMissing", "message": "Your API key is missing."}"#;
        let err = status_error(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(err, AppError::Other(_)));
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Your API key is missing."));

        let err = status_error(StatusCode::BAD_GATEWAY, b"<html>");
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn parses_articles_and_defaults_missing_description() {
        let body = br#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "Wire"}, "title": "Markets rally", "description": "Stocks rose.", "url": "https://example.com/a", "publishedAt": "2026-10-19T08:00:00Z"},
                {"source": {"id": null, "name": "Wire"}, "title": "Storm warning", "description": null, "url": "https://example.com/b"}
            ]
        }"#;

        let headlines = parse_headlines(body).unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].title, "Markets rally");
        assert_eq!(headlines[0].description, "Stocks rose.");
        assert_eq!(headlines[1].description, "");
        assert_eq!(headlines[1].url, "https://example.com/b");
    }

    #[test]
    fn api_error_status_is_an_error() {
        let body = br#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}"#;
        let err = parse_headlines(body).unwrap_err();
        assert!(matches!(err, AppError::NewsApi(ref msg) if msg.contains("apiKeyInvalid")));
    }

    #[test]
    fn missing_title_rejects_the_batch() {
        let body = br#"{"status": "ok", "articles": [
            {"title": "Fine", "description": "", "url": "https://example.com/1"},
            {"description": "orphan", "url": "https://example.com/2"}
        ]}"#;
        assert!(parse_headlines(body).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_headlines(b"<html>"), Err(AppError::Json(_))));
    }

    #[test]
    fn endpoint_carries_country_and_key() {
        let client = NewsApiClient::new("https://newsapi.org/v2/", "secret", "us").unwrap();
        assert_eq!(
            client.endpoint.as_str(),
            "https://newsapi.org/v2/top-headlines?country=us&apiKey=secret"
        );
    }
}
