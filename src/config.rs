use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const CONFIG_PATH_VAR: &str = "HEADLINE_DIGEST_CONFIG";

/// One year. Longer periods overflow timer deadlines.
const MAX_INGEST_INTERVAL_HOURS: u64 = 24 * 365;
const MAX_ENRICH_POLL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_news_api_base_url")]
    pub news_api_base_url: String,

    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_ingest_interval")]
    pub ingest_interval_hours: u64,

    /// Run an ingestion immediately instead of waiting one full interval.
    #[serde(default)]
    pub run_on_startup: bool,

    /// Fallback poll for the enrichment stages when no change notification arrives.
    #[serde(default = "default_enrich_poll")]
    pub enrich_poll_seconds: u64,

    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,

    // Secrets never touch the config file.
    #[serde(skip)]
    pub news_api_key: String,

    #[serde(skip)]
    pub database_url: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_news_api_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_ingest_interval() -> u64 {
    12
}

fn default_enrich_poll() -> u64 {
    60
}

fn default_summary_sentences() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            news_api_base_url: default_news_api_base_url(),
            country: default_country(),
            ingest_interval_hours: default_ingest_interval(),
            run_on_startup: false,
            enrich_poll_seconds: default_enrich_poll(),
            summary_sentences: default_summary_sentences(),
            news_api_key: String::new(),
            database_url: String::new(),
        }
    }
}

impl Config {
    /// Loads settings from the config file and secrets from the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file(&Self::config_path())?;
        config.news_api_key = required_env(NEWS_API_KEY_VAR)?;
        config.database_url = required_env(DATABASE_URL_VAR)?;
        config.validate()?;
        Ok(config)
    }

    fn load_file(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("headline-digest")
            .join("config.toml")
    }

    pub fn ingest_interval(&self) -> Duration {
        Duration::from_secs(self.ingest_interval_hours * 60 * 60)
    }

    pub fn enrich_poll(&self) -> Duration {
        Duration::from_secs(self.enrich_poll_seconds)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_INGEST_INTERVAL_HOURS).contains(&self.ingest_interval_hours) {
            return Err(AppError::Config(format!(
                "ingest_interval_hours must be between 1 and {MAX_INGEST_INTERVAL_HOURS}"
            )));
        }
        if !(1..=MAX_ENRICH_POLL_SECONDS).contains(&self.enrich_poll_seconds) {
            return Err(AppError::Config(format!(
                "enrich_poll_seconds must be between 1 and {MAX_ENRICH_POLL_SECONDS}"
            )));
        }
        if self.summary_sentences == 0 {
            return Err(AppError::Config(
                "summary_sentences must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{name} must be set"))),
    }
}
