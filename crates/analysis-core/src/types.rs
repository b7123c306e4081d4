use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::guards::{bounded_or, ratio_or};

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub vwap: Option<f64>,
}

fn default_timeframe() -> String {
    "1D".to_string()
}

/// Single-bar quote snapshot handed to the engine.
///
/// `high >= current_price >= low` is expected but never enforced here; the
/// engine degrades to neutral numbers when the bar is malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

impl MarketSnapshot {
    /// Copy with every non-finite or out-of-range numeric field replaced by zero.
    pub fn sanitized(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            current_price: bounded_or(self.current_price, 0.0),
            previous_close: bounded_or(self.previous_close, 0.0),
            change: bounded_or(self.change, 0.0),
            change_percent: bounded_or(self.change_percent, 0.0),
            high: bounded_or(self.high, 0.0),
            low: bounded_or(self.low, 0.0),
            volume: bounded_or(self.volume, 0.0),
            timeframe: self.timeframe.clone(),
        }
    }

    /// Day range (high - low).
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Where the current price sits inside the day range, 0-100.
    /// A flat range reports the midpoint (50).
    pub fn price_position(&self) -> f64 {
        ratio_or(self.current_price - self.low, self.range(), 0.5) * 100.0
    }

    pub fn abs_change_percent(&self) -> f64 {
        self.change_percent.abs()
    }
}

/// News-sentiment label as delivered by the sentiment collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentLabel {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
    Unavailable,
}

/// How strongly news is expected to move the stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsImpact {
    High,
    Medium,
    Low,
    None,
}

impl NewsImpact {
    pub fn from_score(score: f64) -> Self {
        if score > 0.5 {
            NewsImpact::High
        } else if score > 0.2 {
            NewsImpact::Medium
        } else {
            NewsImpact::Low
        }
    }
}

/// News sentiment summary for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSentiment {
    pub sentiment: SentimentLabel,
    pub score: f64,
    pub articles_count: u32,
    #[serde(default)]
    pub key_topics: Vec<String>,
    pub impact: NewsImpact,
    #[serde(default)]
    pub reasoning: String,
}

impl NewsSentiment {
    /// Sentinel used whenever the collaborator could not be reached.
    pub fn unavailable() -> Self {
        Self {
            sentiment: SentimentLabel::Unavailable,
            score: 0.0,
            articles_count: 0,
            key_topics: Vec::new(),
            impact: NewsImpact::None,
            reasoning: "News sentiment unavailable".to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.sentiment != SentimentLabel::Unavailable
    }
}

impl Default for NewsSentiment {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Coarse market regime for the current bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketState {
    Trending,
    Ranging,
    Volatile,
    Consolidating,
}

impl MarketState {
    pub fn name(&self) -> &'static str {
        match self {
            MarketState::Trending => "trending",
            MarketState::Ranging => "ranging",
            MarketState::Volatile => "volatile",
            MarketState::Consolidating => "consolidating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendTier {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityTier {
    Low,
    Medium,
    High,
    Extreme,
}

impl VolatilityTier {
    /// Tier an ATR expressed as percent of price.
    pub fn from_atr_percent(atr_percent: f64) -> Self {
        if atr_percent < 1.0 {
            VolatilityTier::Low
        } else if atr_percent < 2.0 {
            VolatilityTier::Medium
        } else if atr_percent < 4.0 {
            VolatilityTier::High
        } else {
            VolatilityTier::Extreme
        }
    }
}

/// Classified market condition, recomputed on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCondition {
    pub state: MarketState,
    pub trend: TrendTier,
    pub volatility: VolatilityTier,
    /// Percent move against the previous close
    pub momentum: f64,
    /// Day range as percent of price
    pub atr: f64,
    pub reasoning: String,
}

/// Indicators the selector can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorKind {
    Rsi,
    BollingerBands,
    Fibonacci,
    Volume,
    Macd,
    Atr,
    Stochastic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedIndicator {
    pub indicator: IndicatorKind,
    pub weight: f64,
}

/// Which indicator implementation produced the values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSourceKind {
    SnapshotProxy,
    HistoricalSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiValue {
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub percent_b: f64,
    pub bandwidth: f64,
}

/// Retracement levels across a low..high range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub level_0: f64,
    pub level_236: f64,
    pub level_382: f64,
    pub level_500: f64,
    pub level_618: f64,
    pub level_786: f64,
    pub level_1000: f64,
}

impl FibonacciLevels {
    pub fn from_range(low: f64, high: f64) -> Self {
        let range = high - low;
        let at = |ratio: f64| low + range * ratio;
        Self {
            level_0: at(0.0),
            level_236: at(0.236),
            level_382: at(0.382),
            level_500: at(0.5),
            level_618: at(0.618),
            level_786: at(0.786),
            level_1000: at(1.0),
        }
    }

    /// The five retracement levels strictly inside the range, with their labels.
    pub fn interior(&self) -> [(&'static str, f64); 5] {
        [
            ("23.6%", self.level_236),
            ("38.2%", self.level_382),
            ("50%", self.level_500),
            ("61.8%", self.level_618),
            ("78.6%", self.level_786),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeTrend {
    Surge,
    AboveAverage,
    Normal,
    BelowAverage,
    Declining,
}

impl VolumeTrend {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 2.0 {
            VolumeTrend::Surge
        } else if ratio > 1.2 {
            VolumeTrend::AboveAverage
        } else if ratio > 0.8 {
            VolumeTrend::Normal
        } else if ratio > 0.5 {
            VolumeTrend::BelowAverage
        } else {
            VolumeTrend::Declining
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeValue {
    pub current: f64,
    pub average: f64,
    pub ratio: f64,
    pub trend: VolumeTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdTrend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub trend: MacdTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrValue {
    /// Average range in price units
    pub value: f64,
    /// Average range as percent of price
    pub percent: f64,
    pub volatility: VolatilityTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StochasticSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl StochasticSignal {
    pub fn from_k(k: f64) -> Self {
        if k > 80.0 {
            StochasticSignal::Overbought
        } else if k < 20.0 {
            StochasticSignal::Oversold
        } else {
            StochasticSignal::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
    pub signal: StochasticSignal,
}

/// Sparse indicator record: only selected indicators are populated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bollinger_bands: Option<BollingerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fibonacci: Option<FibonacciLevels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atr: Option<AtrValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stochastic: Option<StochasticValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Price band flagged as dangerous to trade into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZone {
    pub low: f64,
    pub high: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonType {
    Support,
    Resistance,
    Risk,
    Opportunity,
}

/// Human-readable justification shown next to the recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalReason {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub reason_type: ReasonType,
}

/// Recommendation produced for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub sentiment: Sentiment,
    pub action: Action,
    pub confidence: f64, // 0 to 100
    pub risk_level: RiskLevel,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub time_horizon: String,
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
    pub risk_zones: Vec<RiskZone>,
    pub technical_reasons: Vec<TechnicalReason>,
    pub indicators: IndicatorSet,
    pub market_condition: MarketCondition,
    pub selected_indicators: Vec<SelectedIndicator>,
    pub bullish_score: f64,
    pub bearish_score: f64,
    pub indicator_source: IndicatorSourceKind,
}
