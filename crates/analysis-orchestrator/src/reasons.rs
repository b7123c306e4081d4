//! Narrative catalogue. Each rule pairs a condition with the reason it emits;
//! rules are evaluated in table order and the first `MAX_REASONS` hits are kept.

use analysis_core::{
    Action, IndicatorSet, MacdTrend, MarketCondition, MarketSnapshot, ReasonType,
    StochasticSignal, TechnicalReason, VolatilityTier, VolumeTrend,
};

use crate::levels::PriceLevels;
use crate::scoring::{is_near, near_fibonacci_level};

pub const MAX_REASONS: usize = 5;

pub struct ReasonContext<'a> {
    pub snapshot: &'a MarketSnapshot,
    pub condition: &'a MarketCondition,
    pub indicators: &'a IndicatorSet,
    pub levels: &'a PriceLevels,
    pub action: Action,
}

struct ReasonRule {
    reason_type: ReasonType,
    applies: fn(&ReasonContext) -> bool,
    render: fn(&ReasonContext) -> (String, String),
}

fn rsi_value(ctx: &ReasonContext) -> Option<f64> {
    ctx.indicators.rsi.map(|r| r.value)
}

fn percent_b(ctx: &ReasonContext) -> Option<f64> {
    ctx.indicators.bollinger_bands.map(|b| b.percent_b)
}

fn volume_trend(ctx: &ReasonContext) -> Option<VolumeTrend> {
    ctx.indicators.volume.map(|v| v.trend)
}

fn volume_ratio(ctx: &ReasonContext) -> f64 {
    ctx.indicators.volume.map(|v| v.ratio).unwrap_or(1.0)
}

fn macd_trend(ctx: &ReasonContext) -> Option<MacdTrend> {
    ctx.indicators.macd.map(|m| m.trend)
}

fn stochastic_signal(ctx: &ReasonContext) -> Option<StochasticSignal> {
    ctx.indicators.stochastic.map(|s| s.signal)
}

fn fibonacci_hit(ctx: &ReasonContext) -> Option<(&'static str, f64)> {
    ctx.indicators
        .fibonacci
        .as_ref()
        .and_then(|fib| near_fibonacci_level(ctx.snapshot.current_price, fib))
}

fn near_support(ctx: &ReasonContext) -> Option<f64> {
    ctx.levels
        .nearest_support()
        .filter(|&level| is_near(ctx.snapshot.current_price, level))
}

fn near_resistance(ctx: &ReasonContext) -> Option<f64> {
    ctx.levels
        .nearest_resistance()
        .filter(|&level| is_near(ctx.snapshot.current_price, level))
}

const CATALOGUE: &[ReasonRule] = &[
    ReasonRule {
        reason_type: ReasonType::Opportunity,
        applies: |ctx| rsi_value(ctx).is_some_and(|v| v < 30.0),
        render: |ctx| {
            (
                "RSI Oversold".to_string(),
                format!(
                    "RSI at {:.1} suggests selling is overdone and a bounce is likely",
                    rsi_value(ctx).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Risk,
        applies: |ctx| rsi_value(ctx).is_some_and(|v| v > 70.0),
        render: |ctx| {
            (
                "RSI Overbought".to_string(),
                format!(
                    "RSI at {:.1} suggests buying is stretched and a pullback is likely",
                    rsi_value(ctx).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Support,
        applies: |ctx| percent_b(ctx).is_some_and(|b| b < 0.2),
        render: |ctx| {
            (
                "Near Lower Bollinger Band".to_string(),
                format!(
                    "Price is trading near the lower band at ₹{:.2}, a common mean-reversion zone",
                    ctx.indicators.bollinger_bands.map(|b| b.lower).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Resistance,
        applies: |ctx| percent_b(ctx).is_some_and(|b| b > 0.8),
        render: |ctx| {
            (
                "Near Upper Bollinger Band".to_string(),
                format!(
                    "Price is pressing the upper band at ₹{:.2}, where rallies often stall",
                    ctx.indicators.bollinger_bands.map(|b| b.upper).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Risk,
        applies: |ctx| ctx.indicators.bollinger_bands.is_some_and(|b| b.bandwidth < 0.1),
        render: |ctx| {
            (
                "Bollinger Squeeze".to_string(),
                format!(
                    "Bands are only {:.1}% wide; a sharp breakout in either direction is building",
                    ctx.indicators.bollinger_bands.map(|b| b.bandwidth * 100.0).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Opportunity,
        applies: |ctx| volume_trend(ctx) == Some(VolumeTrend::Surge),
        render: |ctx| {
            (
                "Volume Surge".to_string(),
                format!(
                    "Volume is {:.1}x the average, confirming strong participation in today's move",
                    volume_ratio(ctx)
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Opportunity,
        applies: |ctx| volume_trend(ctx) == Some(VolumeTrend::AboveAverage),
        render: |ctx| {
            (
                "Above-Average Volume".to_string(),
                format!(
                    "Volume is {:.1}x the average, lending weight to the price action",
                    volume_ratio(ctx)
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Risk,
        applies: |ctx| volume_trend(ctx) == Some(VolumeTrend::Declining),
        render: |ctx| {
            (
                "Declining Volume".to_string(),
                format!(
                    "Volume is only {:.1}x the average; the move lacks conviction",
                    volume_ratio(ctx)
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Opportunity,
        applies: |ctx| macd_trend(ctx) == Some(MacdTrend::Bullish),
        render: |ctx| {
            (
                "MACD Bullish Momentum".to_string(),
                format!(
                    "MACD histogram at {:.2} shows momentum building to the upside",
                    ctx.indicators.macd.map(|m| m.histogram).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Risk,
        applies: |ctx| macd_trend(ctx) == Some(MacdTrend::Bearish),
        render: |ctx| {
            (
                "MACD Bearish Momentum".to_string(),
                format!(
                    "MACD histogram at {:.2} shows momentum building to the downside",
                    ctx.indicators.macd.map(|m| m.histogram).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Opportunity,
        applies: |ctx| stochastic_signal(ctx) == Some(StochasticSignal::Oversold),
        render: |ctx| {
            (
                "Stochastic Oversold".to_string(),
                format!(
                    "%K at {:.1} is deep in oversold territory",
                    ctx.indicators.stochastic.map(|s| s.k).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Risk,
        applies: |ctx| stochastic_signal(ctx) == Some(StochasticSignal::Overbought),
        render: |ctx| {
            (
                "Stochastic Overbought".to_string(),
                format!(
                    "%K at {:.1} is deep in overbought territory",
                    ctx.indicators.stochastic.map(|s| s.k).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Support,
        applies: |ctx| {
            fibonacci_hit(ctx).is_some_and(|(_, level)| ctx.snapshot.current_price >= level)
        },
        render: |ctx| {
            let (label, level) = fibonacci_hit(ctx).unwrap_or_default();
            (
                format!("Fibonacci {} Support", label),
                format!("Price is holding just above the {} retracement at ₹{:.2}", label, level),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Resistance,
        applies: |ctx| {
            fibonacci_hit(ctx).is_some_and(|(_, level)| ctx.snapshot.current_price < level)
        },
        render: |ctx| {
            let (label, level) = fibonacci_hit(ctx).unwrap_or_default();
            (
                format!("Fibonacci {} Resistance", label),
                format!("Price is testing the {} retracement at ₹{:.2} from below", label, level),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Support,
        applies: |ctx| near_support(ctx).is_some(),
        render: |ctx| {
            (
                "Near Support".to_string(),
                format!(
                    "Price is within 1% of support at ₹{:.2}",
                    near_support(ctx).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Resistance,
        applies: |ctx| near_resistance(ctx).is_some(),
        render: |ctx| {
            (
                "Near Resistance".to_string(),
                format!(
                    "Price is within 1% of resistance at ₹{:.2}",
                    near_resistance(ctx).unwrap_or_default()
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Risk,
        applies: |ctx| ctx.condition.volatility >= VolatilityTier::High,
        render: |ctx| {
            (
                "High Volatility".to_string(),
                format!(
                    "The day's range is {:.2}% of price; size positions accordingly",
                    ctx.condition.atr
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Resistance,
        applies: |ctx| ctx.snapshot.price_position() > 90.0,
        render: |ctx| {
            (
                "Trading Near Day High".to_string(),
                format!(
                    "Price is in the top {:.0}% of today's range near ₹{:.2}",
                    100.0 - ctx.snapshot.price_position(),
                    ctx.snapshot.high
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Support,
        applies: |ctx| ctx.snapshot.price_position() < 10.0,
        render: |ctx| {
            (
                "Trading Near Day Low".to_string(),
                format!(
                    "Price is in the bottom {:.0}% of today's range near ₹{:.2}",
                    ctx.snapshot.price_position(),
                    ctx.snapshot.low
                ),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Opportunity,
        applies: |ctx| ctx.snapshot.change_percent > 3.0,
        render: |ctx| {
            (
                "Strong Bullish Momentum".to_string(),
                format!("Up {:.2}% on the day with buyers in control", ctx.snapshot.change_percent),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Risk,
        applies: |ctx| ctx.snapshot.change_percent < -3.0,
        render: |ctx| {
            (
                "Strong Bearish Momentum".to_string(),
                format!("Down {:.2}% on the day with sellers in control", ctx.snapshot.change_percent.abs()),
            )
        },
    },
    ReasonRule {
        reason_type: ReasonType::Risk,
        applies: |ctx| ctx.action == Action::Hold,
        render: |_| {
            (
                "Mixed Signals".to_string(),
                "Indicators disagree; wait for a clearer setup before committing".to_string(),
            )
        },
    },
];

/// Every catalogue rule that applies, in catalogue order, capped at `MAX_REASONS`.
pub fn technical_reasons(ctx: &ReasonContext) -> Vec<TechnicalReason> {
    CATALOGUE
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .take(MAX_REASONS)
        .map(|rule| {
            let (title, description) = (rule.render)(ctx);
            TechnicalReason {
                title,
                description,
                reason_type: rule.reason_type,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{
        BollingerValue, FibonacciLevels, MarketState, RsiValue, TrendTier, VolumeValue,
    };

    fn snapshot(price: f64, change_percent: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "INFY".to_string(),
            current_price: price,
            previous_close: 100.0,
            change: price - 100.0,
            change_percent,
            high: 110.0,
            low: 90.0,
            volume: 1_000_000.0,
            timeframe: "1D".to_string(),
        }
    }

    fn condition(volatility: VolatilityTier) -> MarketCondition {
        MarketCondition {
            state: MarketState::Consolidating,
            trend: TrendTier::Neutral,
            volatility,
            momentum: 0.0,
            atr: 1.5,
            reasoning: String::new(),
        }
    }

    fn reasons_for(
        snap: &MarketSnapshot,
        indicators: &IndicatorSet,
        volatility: VolatilityTier,
        action: Action,
    ) -> Vec<TechnicalReason> {
        let levels = PriceLevels::compute(snap, indicators);
        let condition = condition(volatility);
        technical_reasons(&ReasonContext {
            snapshot: snap,
            condition: &condition,
            indicators,
            levels: &levels,
            action,
        })
    }

    fn titles(reasons: &[TechnicalReason]) -> Vec<&str> {
        reasons.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_quiet_buy_has_no_reasons() {
        let snap = snapshot(103.0, 1.0);
        let reasons = reasons_for(&snap, &IndicatorSet::default(), VolatilityTier::Low, Action::Buy);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_hold_reports_mixed_signals() {
        let snap = snapshot(103.0, 1.0);
        let reasons = reasons_for(&snap, &IndicatorSet::default(), VolatilityTier::Low, Action::Hold);
        assert_eq!(titles(&reasons), vec!["Mixed Signals"]);
        assert_eq!(reasons[0].reason_type, ReasonType::Risk);
    }

    #[test]
    fn test_catalogue_order_and_types() {
        let snap = snapshot(96.0, -4.0);
        let set = IndicatorSet {
            rsi: Some(RsiValue { value: 18.0 }),
            bollinger_bands: Some(BollingerValue {
                upper: 110.0,
                middle: 100.0,
                lower: 95.0,
                percent_b: 0.07,
                bandwidth: 0.15,
            }),
            ..Default::default()
        };
        let reasons = reasons_for(&snap, &set, VolatilityTier::Low, Action::Sell);

        assert_eq!(
            titles(&reasons),
            vec!["RSI Oversold", "Near Lower Bollinger Band", "Strong Bearish Momentum"]
        );
        assert_eq!(reasons[0].reason_type, ReasonType::Opportunity);
        assert_eq!(reasons[1].reason_type, ReasonType::Support);
        assert!(reasons[0].description.contains("18.0"));
    }

    #[test]
    fn test_truncated_to_five() {
        let snap = snapshot(109.5, 4.0);
        let set = IndicatorSet {
            rsi: Some(RsiValue { value: 85.0 }),
            bollinger_bands: Some(BollingerValue {
                upper: 110.0,
                middle: 105.0,
                lower: 100.0,
                percent_b: 0.95,
                bandwidth: 0.05,
            }),
            volume: Some(VolumeValue {
                current: 3.0,
                average: 1.0,
                ratio: 3.0,
                trend: VolumeTrend::Surge,
            }),
            fibonacci: Some(FibonacciLevels::from_range(90.0, 110.0)),
            ..Default::default()
        };
        let reasons = reasons_for(&snap, &set, VolatilityTier::Extreme, Action::Hold);

        assert_eq!(reasons.len(), MAX_REASONS);
        assert_eq!(
            titles(&reasons),
            vec![
                "RSI Overbought",
                "Near Upper Bollinger Band",
                "Bollinger Squeeze",
                "Volume Surge",
                "Near Resistance",
            ]
        );
    }

    #[test]
    fn test_fibonacci_reason_side() {
        let set = IndicatorSet {
            fibonacci: Some(FibonacciLevels::from_range(90.0, 110.0)),
            ..Default::default()
        };

        // 38.2% = 97.64
        let below = reasons_for(&snapshot(97.5, -2.5), &set, VolatilityTier::Low, Action::Buy);
        assert_eq!(below[0].title, "Fibonacci 38.2% Resistance");
        assert_eq!(below[0].reason_type, ReasonType::Resistance);

        let above = reasons_for(&snapshot(97.8, -2.2), &set, VolatilityTier::Low, Action::Buy);
        assert_eq!(above[0].title, "Fibonacci 38.2% Support");
        assert_eq!(above[0].reason_type, ReasonType::Support);
    }

    #[test]
    fn test_high_volatility_reason() {
        let snap = snapshot(103.0, 1.0);
        let reasons = reasons_for(&snap, &IndicatorSet::default(), VolatilityTier::High, Action::Buy);
        assert_eq!(titles(&reasons), vec!["High Volatility"]);
        assert!(reasons[0].description.contains("1.50%"));
    }
}
