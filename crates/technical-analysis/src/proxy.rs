//! Single-bar indicator approximations.
//!
//! With only today's bar available (price, previous close, day range, volume)
//! the textbook indicators cannot be computed, so each one is approximated from
//! where the price sits inside the day range and how far it moved. The formulas
//! are fixed; the dashboard's thresholds are tuned against them.

use analysis_core::guards::ratio_or;
use analysis_core::{
    AtrValue, BollingerValue, FibonacciLevels, MacdTrend, MacdValue, MarketSnapshot, RsiValue,
    StochasticSignal, StochasticValue, VolatilityTier, VolumeTrend, VolumeValue,
};

pub fn rsi(snapshot: &MarketSnapshot) -> RsiValue {
    let move_pct = snapshot.abs_change_percent();
    let value = if snapshot.change > 0.0 && move_pct > 2.0 {
        (70.0 + move_pct * 3.0).min(95.0)
    } else if snapshot.change < 0.0 && move_pct > 2.0 {
        (30.0 - move_pct * 3.0).max(5.0)
    } else {
        30.0 + snapshot.price_position() * 0.4
    };

    // Only reachable outside [5, 95] when the price sits outside the day range.
    RsiValue {
        value: value.clamp(5.0, 95.0),
    }
}

pub fn bollinger_bands(snapshot: &MarketSnapshot) -> BollingerValue {
    let middle = (snapshot.high + snapshot.low + snapshot.current_price) / 3.0;
    let std_dev = snapshot.range() * 0.5 * (1.0 + snapshot.abs_change_percent() / 100.0);
    let upper = middle + 2.0 * std_dev;
    let lower = middle - 2.0 * std_dev;

    BollingerValue {
        upper,
        middle,
        lower,
        percent_b: ratio_or(snapshot.current_price - lower, upper - lower, 0.5),
        bandwidth: ratio_or(upper - lower, middle, 0.0),
    }
}

pub fn fibonacci(snapshot: &MarketSnapshot) -> FibonacciLevels {
    FibonacciLevels::from_range(snapshot.low, snapshot.high)
}

pub fn volume(snapshot: &MarketSnapshot) -> VolumeValue {
    let average = snapshot.volume * 0.8;
    let ratio = ratio_or(snapshot.volume, average, 1.0);

    VolumeValue {
        current: snapshot.volume,
        average,
        ratio,
        trend: VolumeTrend::from_ratio(ratio),
    }
}

pub fn macd(snapshot: &MarketSnapshot) -> MacdValue {
    let macd = snapshot.change_percent * (snapshot.price_position() / 50.0);
    let signal = macd * 0.8;
    let histogram = macd - signal;

    MacdValue {
        macd,
        signal,
        histogram,
        trend: macd_trend(histogram, 0.5),
    }
}

pub(crate) fn macd_trend(histogram: f64, threshold: f64) -> MacdTrend {
    if histogram > threshold {
        MacdTrend::Bullish
    } else if histogram < -threshold {
        MacdTrend::Bearish
    } else {
        MacdTrend::Neutral
    }
}

pub fn atr(snapshot: &MarketSnapshot) -> AtrValue {
    let percent = ratio_or(snapshot.range(), snapshot.current_price, 0.0) * 100.0;

    AtrValue {
        value: snapshot.range(),
        percent,
        volatility: VolatilityTier::from_atr_percent(percent),
    }
}

pub fn stochastic(snapshot: &MarketSnapshot) -> StochasticValue {
    let k = snapshot.price_position();

    StochasticValue {
        k,
        d: k * 0.9,
        signal: StochasticSignal::from_k(k),
    }
}
