use analysis_core::{AnalysisResult, Bar, MarketSnapshot, NewsSentiment, SentimentProvider};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::analyze_with_history;

pub const DEFAULT_SENTIMENT_TIMEOUT: Duration = Duration::from_millis(1500);

/// Async front door to the engine. Resolves news sentiment (bounded by a
/// timeout) before running the synchronous analysis.
#[derive(Clone)]
pub struct AnalysisService {
    sentiment_provider: Option<Arc<dyn SentimentProvider>>,
    sentiment_timeout: Duration,
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisService {
    pub fn new() -> Self {
        Self {
            sentiment_provider: None,
            sentiment_timeout: DEFAULT_SENTIMENT_TIMEOUT,
        }
    }

    pub fn with_sentiment_provider(mut self, provider: Arc<dyn SentimentProvider>) -> Self {
        self.sentiment_provider = Some(provider);
        self
    }

    pub fn with_sentiment_timeout(mut self, timeout: Duration) -> Self {
        self.sentiment_timeout = timeout;
        self
    }

    /// Run the analysis. A caller-supplied sentiment is used as-is; otherwise
    /// the configured provider is asked.
    pub async fn analyze(
        &self,
        snapshot: &MarketSnapshot,
        sentiment: Option<NewsSentiment>,
        history: Option<&[Bar]>,
    ) -> AnalysisResult {
        let sentiment = match sentiment {
            Some(s) => s,
            None => self.resolve_sentiment(&snapshot.symbol).await,
        };

        tracing::info!(
            "Analyzing {} ({}, news impact {:?})",
            snapshot.symbol,
            snapshot.timeframe,
            sentiment.impact
        );

        analyze_with_history(snapshot, Some(&sentiment), history)
    }

    /// Fetch sentiment for `symbol`, degrading any failure or timeout to
    /// `NewsSentiment::unavailable()`.
    pub async fn resolve_sentiment(&self, symbol: &str) -> NewsSentiment {
        let Some(provider) = &self.sentiment_provider else {
            return NewsSentiment::unavailable();
        };

        match tokio::time::timeout(self.sentiment_timeout, provider.fetch_sentiment(symbol)).await {
            Ok(Ok(sentiment)) => sentiment,
            Ok(Err(e)) => {
                tracing::warn!("News sentiment for {} failed: {}", symbol, e);
                NewsSentiment::unavailable()
            }
            Err(_) => {
                tracing::warn!(
                    "News sentiment for {} timed out after {:?}",
                    symbol,
                    self.sentiment_timeout
                );
                NewsSentiment::unavailable()
            }
        }
    }
}
