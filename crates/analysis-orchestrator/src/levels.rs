//! Support/resistance ladders, the trade plan built on them, and risk zones.

use analysis_core::{Action, IndicatorSet, MarketSnapshot, RiskLevel, RiskZone};

pub const MAX_LEVELS: usize = 3;

/// Candidates closer than this are treated as one level.
const LEVEL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceLevels {
    /// Below current price, nearest first
    pub support: Vec<f64>,
    /// Above current price, nearest first
    pub resistance: Vec<f64>,
}

impl PriceLevels {
    pub fn compute(snapshot: &MarketSnapshot, indicators: &IndicatorSet) -> Self {
        let price = snapshot.current_price;
        let floor10 = (price / 10.0).floor() * 10.0;
        let ceil10 = (price / 10.0).ceil() * 10.0;

        let mut support_candidates = vec![snapshot.low, floor10];
        let mut resistance_candidates = vec![snapshot.high, ceil10];

        if let Some(fib) = indicators.fibonacci {
            support_candidates.extend([fib.level_236, fib.level_382, fib.level_618]);
            resistance_candidates.extend([fib.level_618, fib.level_786, fib.level_1000]);
        }
        if let Some(bb) = indicators.bollinger_bands {
            support_candidates.push(bb.lower);
            resistance_candidates.push(bb.upper);
        }

        let mut support: Vec<f64> = support_candidates
            .into_iter()
            .filter(|level| level.is_finite() && *level < price)
            .collect();
        support.sort_by(|a, b| b.total_cmp(a));
        dedup_levels(&mut support);
        support.truncate(MAX_LEVELS);

        let mut resistance: Vec<f64> = resistance_candidates
            .into_iter()
            .filter(|level| level.is_finite() && *level > price)
            .collect();
        resistance.sort_by(|a, b| a.total_cmp(b));
        dedup_levels(&mut resistance);
        resistance.truncate(MAX_LEVELS);

        Self { support, resistance }
    }

    pub fn nearest_support(&self) -> Option<f64> {
        self.support.first().copied()
    }

    pub fn nearest_resistance(&self) -> Option<f64> {
        self.resistance.first().copied()
    }

    pub fn farthest_support(&self) -> Option<f64> {
        self.support.last().copied()
    }

    pub fn farthest_resistance(&self) -> Option<f64> {
        self.resistance.last().copied()
    }
}

fn dedup_levels(levels: &mut Vec<f64>) {
    levels.dedup_by(|a, b| (*a - *b).abs() < LEVEL_EPSILON);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePlan {
    pub entry: f64,
    pub target: f64,
    pub stop: f64,
}

impl TradePlan {
    pub fn for_action(action: Action, price: f64, levels: &PriceLevels) -> Self {
        match action {
            Action::Buy => Self {
                entry: price * 0.995,
                target: levels.nearest_resistance().unwrap_or(price * 1.03),
                stop: levels.farthest_support().unwrap_or(price * 0.98),
            },
            Action::Sell => Self {
                entry: price * 1.005,
                target: levels.nearest_support().unwrap_or(price * 0.97),
                stop: levels.farthest_resistance().unwrap_or(price * 1.02),
            },
            Action::Hold => Self {
                entry: price,
                target: price * 1.01,
                stop: price * 0.99,
            },
        }
    }
}

/// Bands just beyond the Bollinger envelope, only flagged on high-risk days.
pub fn risk_zones(risk: RiskLevel, indicators: &IndicatorSet) -> Vec<RiskZone> {
    match (risk, indicators.bollinger_bands) {
        (RiskLevel::High, Some(bb)) => vec![
            RiskZone {
                low: bb.upper,
                high: bb.upper * 1.02,
                reason: "Overextended above the upper Bollinger Band; reversal risk is elevated"
                    .to_string(),
            },
            RiskZone {
                low: bb.lower * 0.98,
                high: bb.lower,
                reason: "Breakdown below the lower Bollinger Band; selling may accelerate"
                    .to_string(),
            },
        ],
        _ => Vec::new(),
    }
}
