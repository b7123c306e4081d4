use async_trait::async_trait;
use crate::{AnalysisError, NewsSentiment};

/// Source of news sentiment for a symbol (HTTP service, cache, fixture).
///
/// Failures are returned, never panicked; callers decide how to degrade.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn fetch_sentiment(&self, symbol: &str) -> Result<NewsSentiment, AnalysisError>;
}
