use analysis_core::guards::{percent_change, ratio_or};
use analysis_core::{MarketCondition, MarketSnapshot, MarketState, TrendTier, VolatilityTier};
use log::debug;

pub mod selector;
pub use selector::{select_indicators, HIGH_IMPACT_DAMPING};

/// Classify the market condition of a single bar.
///
/// Volatility is checked first: a wide-range day is `Volatile` even when the
/// move itself is large and one-directional.
pub fn classify(snapshot: &MarketSnapshot) -> MarketCondition {
    let atr = ratio_or(snapshot.range(), snapshot.current_price, 0.0) * 100.0;
    let volatility = VolatilityTier::from_atr_percent(atr);
    let momentum = percent_change(snapshot.current_price, snapshot.previous_close);
    let trend = classify_trend(snapshot);
    let state = classify_state(snapshot, volatility);

    let reasoning = format!(
        "{} market: day range is {:.2}% of price ({:?} volatility) with a {:.2}% change, trend {:?}",
        capitalize(state.name()),
        atr,
        volatility,
        snapshot.change_percent,
        trend
    );
    debug!("{}: {}", snapshot.symbol, reasoning);

    MarketCondition {
        state,
        trend,
        volatility,
        momentum,
        atr,
        reasoning,
    }
}

fn classify_trend(snapshot: &MarketSnapshot) -> TrendTier {
    let move_pct = snapshot.abs_change_percent();
    let up = snapshot.change > 0.0;

    if move_pct > 3.0 {
        if up { TrendTier::StrongBullish } else { TrendTier::StrongBearish }
    } else if move_pct > 1.5 {
        if up { TrendTier::Bullish } else { TrendTier::Bearish }
    } else {
        TrendTier::Neutral
    }
}

fn classify_state(snapshot: &MarketSnapshot, volatility: VolatilityTier) -> MarketState {
    let move_pct = snapshot.abs_change_percent();
    let position = snapshot.price_position();

    if volatility == VolatilityTier::Extreme {
        MarketState::Volatile
    } else if move_pct > 2.0 {
        MarketState::Trending
    } else if position > 40.0 && position < 60.0 && move_pct < 1.0 {
        MarketState::Ranging
    } else {
        MarketState::Consolidating
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(price: f64, prev: f64, high: f64, low: f64, change_percent: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "SBIN".to_string(),
            current_price: price,
            previous_close: prev,
            change: price - prev,
            change_percent,
            high,
            low,
            volume: 1_000_000.0,
            timeframe: "1D".to_string(),
        }
    }

    #[test]
    fn test_extreme_range_beats_trending() {
        // atr = 10% -> extreme, even though the 2.04% move alone would be trending
        let condition = classify(&snapshot(100.0, 98.0, 105.0, 95.0, 2.04));

        assert_eq!(condition.volatility, VolatilityTier::Extreme);
        assert_eq!(condition.state, MarketState::Volatile);
        assert_eq!(condition.trend, TrendTier::Bullish);
        assert!((condition.atr - 10.0).abs() < 1e-9);
        assert!((condition.momentum - 2.0 / 98.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_day_is_ranging() {
        let condition = classify(&snapshot(100.0, 100.0, 100.5, 99.5, 0.0));

        assert_eq!(condition.state, MarketState::Ranging);
        assert_eq!(condition.trend, TrendTier::Neutral);
        // atr is exactly 1.0, the low/medium boundary
        assert!((condition.atr - 1.0).abs() < 1e-12);
        assert_eq!(condition.volatility, VolatilityTier::Medium);
        assert_eq!(condition.momentum, 0.0);
    }

    #[test]
    fn test_trending_state() {
        let condition = classify(&snapshot(102.5, 100.0, 103.0, 100.0, 2.5));

        assert_eq!(condition.volatility, VolatilityTier::High);
        assert_eq!(condition.state, MarketState::Trending);
        assert_eq!(condition.trend, TrendTier::Bullish);
    }

    #[test]
    fn test_consolidating_when_off_center() {
        // 1.2% move near the top of a tight range
        let condition = classify(&snapshot(101.2, 100.0, 101.3, 100.0, 1.2));
        assert_eq!(condition.state, MarketState::Consolidating);
    }

    #[test]
    fn test_strong_bearish_trend() {
        let condition = classify(&snapshot(96.0, 100.0, 100.5, 95.5, -4.0));
        assert_eq!(condition.trend, TrendTier::StrongBearish);
    }

    #[test]
    fn test_volatility_tiers() {
        assert_eq!(VolatilityTier::from_atr_percent(0.99), VolatilityTier::Low);
        assert_eq!(VolatilityTier::from_atr_percent(1.0), VolatilityTier::Medium);
        assert_eq!(VolatilityTier::from_atr_percent(3.99), VolatilityTier::High);
        assert_eq!(VolatilityTier::from_atr_percent(4.0), VolatilityTier::Extreme);
    }

    #[test]
    fn test_degenerate_snapshot_stays_finite() {
        let condition = classify(&snapshot(0.0, 0.0, 0.0, 0.0, 0.0));

        assert_eq!(condition.atr, 0.0);
        assert_eq!(condition.momentum, 0.0);
        assert_eq!(condition.state, MarketState::Ranging);
    }

    #[test]
    fn test_reasoning_embeds_computed_values() {
        let condition = classify(&snapshot(100.0, 98.0, 105.0, 95.0, 2.04));

        assert!(condition.reasoning.starts_with("Volatile market"));
        assert!(condition.reasoning.contains("10.00%"));
        assert!(condition.reasoning.contains("2.04%"));
    }
}
