//! Confluence scoring: fixed point values per indicator signal, summed into a
//! bullish and a bearish total, then turned into an action.

use analysis_core::guards::ratio_or;
use analysis_core::{
    Action, FibonacciLevels, IndicatorSet, MacdTrend, MarketSnapshot, RiskLevel, Sentiment,
    StochasticSignal, VolumeTrend,
};

/// Score gap required before the engine leaves HOLD.
pub const DECISION_THRESHOLD: f64 = 20.0;
pub const VOLUME_DECLINE_PENALTY: f64 = 10.0;
/// Distance, as a fraction of price, that counts as "at" a level.
pub const LEVEL_PROXIMITY: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfluenceScore {
    pub bullish: f64,
    pub bearish: f64,
    /// Confidence points removed after the decision (declining volume)
    pub confidence_penalty: f64,
}

impl ConfluenceScore {
    fn bull(&mut self, points: f64) {
        self.bullish += points;
    }

    fn bear(&mut self, points: f64) {
        self.bearish += points;
    }

    /// Award points to whichever side the day moved; a flat day confirms nothing.
    fn with_direction(&mut self, change: f64, points: f64) {
        if change > 0.0 {
            self.bull(points);
        } else if change < 0.0 {
            self.bear(points);
        }
    }
}

/// Sum the rulebook over every indicator present in `indicators`.
pub fn score(snapshot: &MarketSnapshot, indicators: &IndicatorSet) -> ConfluenceScore {
    let mut score = ConfluenceScore::default();

    if let Some(rsi) = indicators.rsi {
        let value = rsi.value;
        if value < 30.0 {
            score.bull(25.0);
        } else if value > 70.0 {
            score.bear(25.0);
        } else if value > 50.0 {
            score.bull((value - 50.0) * 0.5);
        } else {
            score.bear((50.0 - value) * 0.5);
        }
    }

    if let Some(bb) = indicators.bollinger_bands {
        if bb.percent_b < 0.2 {
            score.bull(20.0);
        } else if bb.percent_b > 0.8 {
            score.bear(20.0);
        }
        // squeeze: breakout risk both ways
        if bb.bandwidth < 0.1 {
            score.bull(5.0);
            score.bear(5.0);
        }
    }

    if let Some(volume) = indicators.volume {
        match volume.trend {
            VolumeTrend::Surge => score.with_direction(snapshot.change, 25.0),
            VolumeTrend::AboveAverage => score.with_direction(snapshot.change, 15.0),
            VolumeTrend::Declining => score.confidence_penalty += VOLUME_DECLINE_PENALTY,
            VolumeTrend::Normal | VolumeTrend::BelowAverage => {}
        }
    }

    if let Some(fib) = indicators.fibonacci {
        if near_fibonacci_level(snapshot.current_price, &fib).is_some() {
            if snapshot.current_price < fib.level_500 {
                score.bull(15.0);
            } else {
                score.bear(15.0);
            }
        }
    }

    if let Some(macd) = indicators.macd {
        match macd.trend {
            MacdTrend::Bullish => score.bull(20.0),
            MacdTrend::Bearish => score.bear(20.0),
            MacdTrend::Neutral => {}
        }
    }

    if let Some(stoch) = indicators.stochastic {
        match stoch.signal {
            StochasticSignal::Oversold => score.bull(15.0),
            StochasticSignal::Overbought => score.bear(15.0),
            StochasticSignal::Neutral => {}
        }
    }

    let position = snapshot.price_position();
    if snapshot.change > 0.0 && position > 60.0 {
        score.bull(10.0);
    } else if snapshot.change < 0.0 && position < 40.0 {
        score.bear(10.0);
    }

    score
}

/// Closest interior retracement level within `LEVEL_PROXIMITY` of `price`.
pub fn near_fibonacci_level(price: f64, fib: &FibonacciLevels) -> Option<(&'static str, f64)> {
    fib.interior()
        .into_iter()
        .filter(|&(_, level)| is_near(price, level))
        .min_by(|a, b| (price - a.1).abs().total_cmp(&(price - b.1).abs()))
}

pub fn is_near(price: f64, level: f64) -> bool {
    ratio_or((price - level).abs(), price, f64::INFINITY) < LEVEL_PROXIMITY
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub sentiment: Sentiment,
    pub confidence: f64,
}

/// Turn the two totals into an action and a confidence.
///
/// The declining-volume penalty is taken after the per-branch clamp and the
/// HOLD floor of 50 is not re-applied; the result is only kept inside 0..=100.
pub fn decide(score: &ConfluenceScore) -> Decision {
    let diff = (score.bullish - score.bearish).abs();
    let decisive = diff > DECISION_THRESHOLD;

    let (action, sentiment, confidence) = if decisive && score.bullish > score.bearish {
        (Action::Buy, Sentiment::Bullish, (60.0 + diff).min(95.0))
    } else if decisive && score.bearish > score.bullish {
        (Action::Sell, Sentiment::Bearish, (60.0 + diff).min(95.0))
    } else {
        (Action::Hold, Sentiment::Neutral, (70.0 - diff).max(50.0))
    };

    Decision {
        action,
        sentiment,
        confidence: (confidence - score.confidence_penalty).clamp(0.0, 100.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFactor {
    RsiExtreme,
    OutsideBands,
    LargeMove,
    VolumeSurge,
}

/// Risk factors present for this snapshot and indicator set.
pub fn risk_factors(snapshot: &MarketSnapshot, indicators: &IndicatorSet) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if let Some(rsi) = indicators.rsi {
        if rsi.value < 30.0 || rsi.value > 70.0 {
            factors.push(RiskFactor::RsiExtreme);
        }
    }
    if let Some(bb) = indicators.bollinger_bands {
        if bb.percent_b < 0.0 || bb.percent_b > 1.0 {
            factors.push(RiskFactor::OutsideBands);
        }
    }
    if snapshot.abs_change_percent() > 3.0 {
        factors.push(RiskFactor::LargeMove);
    }
    if indicators.volume.map(|v| v.trend) == Some(VolumeTrend::Surge) {
        factors.push(RiskFactor::VolumeSurge);
    }

    factors
}

pub fn risk_level(factors: &[RiskFactor]) -> RiskLevel {
    match factors.len() {
        n if n >= 3 => RiskLevel::High,
        2 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{BollingerValue, MacdValue, RsiValue, StochasticValue, VolumeValue};

    fn snapshot(change: f64, change_percent: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "TCS".to_string(),
            current_price: 100.0,
            previous_close: 100.0 - change,
            change,
            change_percent,
            high: 110.0,
            low: 90.0,
            volume: 1_000_000.0,
            timeframe: "1D".to_string(),
        }
    }

    fn scores(bullish: f64, bearish: f64) -> ConfluenceScore {
        ConfluenceScore {
            bullish,
            bearish,
            confidence_penalty: 0.0,
        }
    }

    fn volume(trend: VolumeTrend) -> VolumeValue {
        VolumeValue {
            current: 1.0,
            average: 1.0,
            ratio: 1.0,
            trend,
        }
    }

    #[test]
    fn test_decision_boundary() {
        assert_eq!(decide(&scores(40.0, 20.0)).action, Action::Hold);
        assert_eq!(decide(&scores(41.0, 20.0)).action, Action::Buy);
        assert_eq!(decide(&scores(20.0, 40.0)).action, Action::Hold);
        assert_eq!(decide(&scores(20.0, 41.0)).action, Action::Sell);
    }

    #[test]
    fn test_buy_confidence() {
        let decision = decide(&scores(51.0, 20.0));
        assert_eq!(decision.sentiment, Sentiment::Bullish);
        assert_eq!(decision.confidence, 91.0);

        assert_eq!(decide(&scores(100.0, 0.0)).confidence, 95.0);
    }

    #[test]
    fn test_sell_confidence() {
        let decision = decide(&scores(0.0, 25.0));
        assert_eq!(decision.action, Action::Sell);
        assert_eq!(decision.sentiment, Sentiment::Bearish);
        assert_eq!(decision.confidence, 85.0);
    }

    #[test]
    fn test_hold_confidence_range() {
        assert_eq!(decide(&scores(10.0, 10.0)).confidence, 70.0);
        assert_eq!(decide(&scores(30.0, 10.0)).confidence, 50.0);
        assert_eq!(decide(&scores(15.0, 10.0)).confidence, 65.0);
    }

    #[test]
    fn test_volume_decline_penalty_not_refloored() {
        let mut s = scores(30.0, 10.0);
        s.confidence_penalty = VOLUME_DECLINE_PENALTY;
        let decision = decide(&s);
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.confidence, 40.0);
    }

    #[test]
    fn test_rsi_points() {
        let snap = snapshot(0.0, 0.0);
        let mut set = IndicatorSet::default();

        set.rsi = Some(RsiValue { value: 25.0 });
        assert_eq!(score(&snap, &set).bullish, 25.0);

        set.rsi = Some(RsiValue { value: 75.0 });
        assert_eq!(score(&snap, &set).bearish, 25.0);

        set.rsi = Some(RsiValue { value: 60.0 });
        assert_eq!(score(&snap, &set).bullish, 5.0);

        set.rsi = Some(RsiValue { value: 40.0 });
        assert_eq!(score(&snap, &set).bearish, 5.0);
    }

    #[test]
    fn test_bollinger_squeeze_scores_both_sides() {
        let snap = snapshot(0.0, 0.0);
        let set = IndicatorSet {
            bollinger_bands: Some(BollingerValue {
                upper: 101.0,
                middle: 100.0,
                lower: 99.0,
                percent_b: 0.1,
                bandwidth: 0.02,
            }),
            ..Default::default()
        };
        let s = score(&snap, &set);
        assert_eq!(s.bullish, 25.0);
        assert_eq!(s.bearish, 5.0);
    }

    #[test]
    fn test_volume_follows_price_direction() {
        let set = IndicatorSet {
            volume: Some(volume(VolumeTrend::Surge)),
            ..Default::default()
        };
        // position 50, so no momentum-alignment points
        assert_eq!(score(&snapshot(1.0, 1.0), &set).bullish, 25.0);
        assert_eq!(score(&snapshot(-1.0, -1.0), &set).bearish, 25.0);

        let flat = score(&snapshot(0.0, 0.0), &set);
        assert_eq!(flat.bullish, 0.0);
        assert_eq!(flat.bearish, 0.0);
    }

    #[test]
    fn test_declining_volume_only_penalizes_confidence() {
        let set = IndicatorSet {
            volume: Some(volume(VolumeTrend::Declining)),
            ..Default::default()
        };
        let s = score(&snapshot(1.0, 1.0), &set);
        assert_eq!(s.bullish, 0.0);
        assert_eq!(s.bearish, 0.0);
        assert_eq!(s.confidence_penalty, VOLUME_DECLINE_PENALTY);
    }

    #[test]
    fn test_fibonacci_proximity() {
        // 90..110 range: 38.2% level = 97.64; price 97.5 is within 1% and below the 50% level
        let mut snap = snapshot(0.0, 0.0);
        snap.current_price = 97.5;
        let set = IndicatorSet {
            fibonacci: Some(FibonacciLevels::from_range(90.0, 110.0)),
            ..Default::default()
        };
        assert_eq!(score(&snap, &set).bullish, 15.0);

        snap.current_price = 104.0; // 61.8% = 102.36, 78.6% = 105.72: not within 1%
        let s = score(&snap, &set);
        assert_eq!(s.bullish + s.bearish, 0.0);
    }

    #[test]
    fn test_macd_and_stochastic_points() {
        let snap = snapshot(0.0, 0.0);
        let set = IndicatorSet {
            macd: Some(MacdValue {
                macd: 1.0,
                signal: 0.8,
                histogram: 0.6,
                trend: MacdTrend::Bullish,
            }),
            stochastic: Some(StochasticValue {
                k: 90.0,
                d: 81.0,
                signal: StochasticSignal::Overbought,
            }),
            ..Default::default()
        };
        let s = score(&snap, &set);
        assert_eq!(s.bullish, 20.0);
        assert_eq!(s.bearish, 15.0);
    }

    #[test]
    fn test_momentum_alignment() {
        let mut snap = snapshot(2.0, 2.0);
        snap.current_price = 108.0; // position 90
        assert_eq!(score(&snap, &IndicatorSet::default()).bullish, 10.0);

        let mut snap = snapshot(-2.0, -2.0);
        snap.current_price = 92.0; // position 10
        assert_eq!(score(&snap, &IndicatorSet::default()).bearish, 10.0);
    }

    #[test]
    fn test_risk_levels() {
        let mut snap = snapshot(5.0, 5.0);
        let set = IndicatorSet {
            rsi: Some(RsiValue { value: 85.0 }),
            volume: Some(volume(VolumeTrend::Surge)),
            ..Default::default()
        };
        let factors = risk_factors(&snap, &set);
        assert_eq!(factors.len(), 3);
        assert_eq!(risk_level(&factors), RiskLevel::High);

        snap.change_percent = 1.0;
        assert_eq!(risk_level(&risk_factors(&snap, &set)), RiskLevel::Medium);
        assert_eq!(risk_level(&risk_factors(&snap, &IndicatorSet::default())), RiskLevel::Low);
    }
}
