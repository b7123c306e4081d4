use anyhow::Context;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the news-sentiment service; `None` disables the lookup
    pub news_sentiment_url: Option<String>,
    pub sentiment_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let news_sentiment_url = lookup("NEWS_SENTIMENT_URL").filter(|url| !url.trim().is_empty());

        let timeout_ms = lookup("SENTIMENT_TIMEOUT_MS")
            .unwrap_or_else(|| "1500".to_string())
            .parse::<u64>()
            .context("SENTIMENT_TIMEOUT_MS must be a whole number of milliseconds")?;

        Ok(Self {
            host,
            port,
            news_sentiment_url,
            sentiment_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
