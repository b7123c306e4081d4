use analysis_core::{
    AnalysisError, NewsImpact, NewsSentiment, SentimentLabel, SentimentProvider,
};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Body returned by the news-sentiment service. `impact` is optional and
/// derived from `score` when the service leaves it out.
#[derive(Debug, Clone, Deserialize)]
struct SentimentPayload {
    sentiment: SentimentLabel,
    score: f64,
    #[serde(default)]
    articles_count: u32,
    #[serde(default)]
    key_topics: Vec<String>,
    #[serde(default)]
    impact: Option<NewsImpact>,
    #[serde(default)]
    reasoning: String,
}

impl From<SentimentPayload> for NewsSentiment {
    fn from(payload: SentimentPayload) -> Self {
        let score = if payload.score.is_finite() { payload.score } else { 0.0 };
        Self {
            sentiment: payload.sentiment,
            score,
            articles_count: payload.articles_count,
            key_topics: payload.key_topics,
            impact: payload.impact.unwrap_or_else(|| NewsImpact::from_score(score)),
            reasoning: payload.reasoning,
        }
    }
}

/// HTTP client for the news-sentiment service.
#[derive(Clone)]
pub struct NewsSentimentClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl NewsSentimentClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, AnalysisError> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| AnalysisError::InvalidData(format!("Invalid sentiment service URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AnalysisError::InvalidData(format!(
                "Sentiment service URL cannot take a path: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// `{base}/sentiment/{symbol}` with the symbol percent-encoded as a single
    /// path segment.
    fn sentiment_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("sentiment").push(symbol);
        }
        url
    }

    fn map_error(&self, err: reqwest::Error) -> AnalysisError {
        if err.is_timeout() {
            AnalysisError::Timeout(self.timeout.as_millis() as u64)
        } else {
            AnalysisError::ApiError(err.to_string())
        }
    }
}

#[async_trait]
impl SentimentProvider for NewsSentimentClient {
    async fn fetch_sentiment(&self, symbol: &str) -> Result<NewsSentiment, AnalysisError> {
        let url = self.sentiment_url(symbol);
        tracing::debug!("Fetching news sentiment from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "Sentiment service returned {}",
                response.status()
            )));
        }

        let payload = response
            .json::<SentimentPayload>()
            .await
            .map_err(|e| self.map_error(e))?;

        Ok(payload.into())
    }
}
