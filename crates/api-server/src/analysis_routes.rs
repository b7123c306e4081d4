//! Analysis Routes
//!
//! `POST /api/analyze` runs the confluence engine on one market snapshot;
//! `GET /health` is the liveness probe.

use analysis_core::{
    AnalysisResult, Bar, MarketSnapshot, NewsImpact, NewsSentiment, SentimentLabel,
};
use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::request_id::RequestId;
use crate::{ApiResponse, AppError, AppState};

/// News-sentiment fields sent alongside the snapshot. The label is what
/// marks them as present.
#[derive(Debug, Default, Deserialize)]
pub struct NewsFields {
    pub sentiment: Option<SentimentLabel>,
    pub score: Option<f64>,
    pub articles_count: Option<u32>,
    #[serde(default)]
    pub key_topics: Vec<String>,
    pub impact: Option<NewsImpact>,
    #[serde(default)]
    pub reasoning: String,
}

impl NewsFields {
    fn into_sentiment(self) -> Option<NewsSentiment> {
        let label = self.sentiment?;
        let score = self.score.filter(|s| s.is_finite()).unwrap_or(0.0);

        Some(NewsSentiment {
            sentiment: label,
            score,
            articles_count: self.articles_count.unwrap_or(0),
            key_topics: self.key_topics,
            impact: self.impact.unwrap_or_else(|| NewsImpact::from_score(score)),
            reasoning: self.reasoning,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    pub snapshot: MarketSnapshot,
    #[serde(flatten)]
    pub news: NewsFields,
    /// Optional bar history; enables the textbook indicators when long enough
    #[serde(default)]
    pub history: Option<Vec<Bar>>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn analyze(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisResult>>, AppError> {
    let AnalyzeRequest {
        snapshot,
        news,
        history,
    } = request;

    if !snapshot.current_price.is_finite() || snapshot.current_price <= 0.0 {
        return Err(AppError::bad_request(format!(
            "current_price must be a positive number, got {}",
            snapshot.current_price
        )));
    }
    if snapshot.symbol.trim().is_empty() {
        return Err(AppError::bad_request("symbol must not be empty"));
    }

    tracing::debug!(
        "[{}] analyze {} with {} history bars",
        request_id.0,
        snapshot.symbol,
        history.as_ref().map_or(0, Vec::len)
    );

    let result = state
        .service
        .analyze(&snapshot, news.into_sentiment(), history.as_deref())
        .await;

    Ok(Json(ApiResponse::success(result)))
}
