//! The pure analysis pipeline: classify, select, compute, score, narrate.

use analysis_core::{AnalysisResult, Bar, MarketSnapshot, NewsImpact, NewsSentiment};
use market_regime_detector::{classify, select_indicators};
use technical_analysis::select_source;

use crate::levels::{risk_zones, PriceLevels, TradePlan};
use crate::reasons::{technical_reasons, ReasonContext};
use crate::scoring::{decide, risk_factors, risk_level, score};

/// Analyze a single snapshot using the snapshot proxies.
pub fn analyze_snapshot(snapshot: &MarketSnapshot, sentiment: Option<&NewsSentiment>) -> AnalysisResult {
    analyze_with_history(snapshot, sentiment, None)
}

/// Analyze a snapshot, computing indicators from `history` when it is long
/// enough and well formed. A rejected history falls back to the proxies for
/// every indicator in the call.
pub fn analyze_with_history(
    snapshot: &MarketSnapshot,
    sentiment: Option<&NewsSentiment>,
    history: Option<&[Bar]>,
) -> AnalysisResult {
    let snapshot = snapshot.sanitized();
    let impact = sentiment.map(|s| s.impact).unwrap_or(NewsImpact::None);

    let condition = classify(&snapshot);
    let selected = select_indicators(&condition, impact);

    let source = select_source(&snapshot, history);
    let indicators = source.compute(&selected);

    let confluence = score(&snapshot, &indicators);
    let decision = decide(&confluence);
    let risk = risk_level(&risk_factors(&snapshot, &indicators));

    let levels = PriceLevels::compute(&snapshot, &indicators);
    let plan = TradePlan::for_action(decision.action, snapshot.current_price, &levels);
    let zones = risk_zones(risk, &indicators);
    let reasons = technical_reasons(&ReasonContext {
        snapshot: &snapshot,
        condition: &condition,
        indicators: &indicators,
        levels: &levels,
        action: decision.action,
    });

    tracing::debug!(
        "{}: {} state, bull {:.1} / bear {:.1} -> {:?} ({:.0}% confidence, {:?} risk)",
        snapshot.symbol,
        condition.state.name(),
        confluence.bullish,
        confluence.bearish,
        decision.action,
        decision.confidence,
        risk
    );

    AnalysisResult {
        symbol: snapshot.symbol.clone(),
        sentiment: decision.sentiment,
        action: decision.action,
        confidence: decision.confidence,
        risk_level: risk,
        entry_price: plan.entry,
        target_price: plan.target,
        stop_loss: plan.stop,
        time_horizon: time_horizon(&snapshot.timeframe).to_string(),
        support_levels: levels.support,
        resistance_levels: levels.resistance,
        risk_zones: zones,
        technical_reasons: reasons,
        indicators,
        market_condition: condition,
        selected_indicators: selected,
        bullish_score: confluence.bullish,
        bearish_score: confluence.bearish,
        indicator_source: source.kind(),
    }
}

/// Holding period suggested by the chart timeframe.
pub fn time_horizon(timeframe: &str) -> &'static str {
    match timeframe.trim() {
        "1m" | "3m" | "5m" | "15m" | "30m" | "1h" | "2h" | "4h" | "intraday" => "Intraday",
        "1w" | "1W" | "weekly" => "Medium-term (1-3 months)",
        "1M" | "1mo" | "monthly" => "Long-term (3+ months)",
        // daily, blank, and anything unrecognised
        _ => "Short-term (1-2 weeks)",
    }
}
