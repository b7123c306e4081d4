//! Which indicators to trust in which regime.

use analysis_core::{IndicatorKind, MarketCondition, MarketState, NewsImpact, SelectedIndicator};
use log::debug;

/// Weight multiplier applied to every indicator when news impact is high.
pub const HIGH_IMPACT_DAMPING: f64 = 0.7;

const ALWAYS: &[(IndicatorKind, f64)] = &[
    (IndicatorKind::Volume, 1.0),
    (IndicatorKind::Fibonacci, 1.0),
];

const BY_STATE: &[(MarketState, &[(IndicatorKind, f64)])] = &[
    (
        MarketState::Trending,
        &[(IndicatorKind::Rsi, 1.5), (IndicatorKind::Macd, 1.5)],
    ),
    (
        MarketState::Ranging,
        &[(IndicatorKind::BollingerBands, 1.5), (IndicatorKind::Stochastic, 1.2)],
    ),
    (
        MarketState::Volatile,
        &[
            (IndicatorKind::Atr, 1.8),
            (IndicatorKind::BollingerBands, 1.3),
            (IndicatorKind::Rsi, 1.0),
        ],
    ),
    (
        MarketState::Consolidating,
        &[(IndicatorKind::BollingerBands, 1.2), (IndicatorKind::Rsi, 1.0)],
    ),
];

/// Indicators for this condition, in table order, with their audit weights.
pub fn select_indicators(condition: &MarketCondition, impact: NewsImpact) -> Vec<SelectedIndicator> {
    let by_state = BY_STATE
        .iter()
        .find(|(state, _)| *state == condition.state)
        .map(|(_, picks)| *picks)
        .unwrap_or(&[]);

    let damping = if impact == NewsImpact::High { HIGH_IMPACT_DAMPING } else { 1.0 };

    let selected: Vec<SelectedIndicator> = ALWAYS
        .iter()
        .chain(by_state)
        .map(|&(indicator, weight)| SelectedIndicator {
            indicator,
            weight: weight * damping,
        })
        .collect();

    debug!(
        "{} state, {:?} news impact -> {} indicators",
        condition.state.name(),
        impact,
        selected.len()
    );

    selected
}
