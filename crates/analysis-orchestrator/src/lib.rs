pub mod engine;
pub mod levels;
pub mod reasons;
pub mod scoring;
pub mod sentiment;
pub mod service;

pub use engine::{analyze_snapshot, analyze_with_history, time_horizon};
pub use levels::{PriceLevels, TradePlan};
pub use scoring::{ConfluenceScore, Decision};
pub use sentiment::NewsSentimentClient;
pub use service::{AnalysisService, DEFAULT_SENTIMENT_TIMEOUT};
