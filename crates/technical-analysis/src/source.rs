use analysis_core::guards::{is_bounded, mean, ratio_or};
use analysis_core::{
    AnalysisError, AtrValue, Bar, BollingerValue, FibonacciLevels, IndicatorKind, IndicatorSet,
    IndicatorSourceKind, MacdValue, MarketSnapshot, RsiValue, SelectedIndicator, StochasticSignal,
    StochasticValue, VolatilityTier, VolumeTrend, VolumeValue,
};

use crate::indicators;
use crate::proxy;

/// Bars needed for MACD(12, 26, 9) to produce a histogram value.
pub const MIN_HISTORY_BARS: usize = 35;

const RSI_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
const BB_STD_DEV: f64 = 2.0;
const FIB_LOOKBACK: usize = 20;
const VOLUME_LOOKBACK: usize = 20;
const ATR_PERIOD: usize = 14;
const STOCH_K: usize = 14;
const STOCH_D: usize = 3;

/// Something that can produce every indicator the engine knows about.
///
/// One source serves a whole analysis call, so values from different
/// implementations never end up in the same `IndicatorSet`.
pub trait IndicatorSource {
    fn kind(&self) -> IndicatorSourceKind;
    fn rsi(&self) -> RsiValue;
    fn bollinger_bands(&self) -> BollingerValue;
    fn fibonacci(&self) -> FibonacciLevels;
    fn volume(&self) -> VolumeValue;
    fn macd(&self) -> MacdValue;
    fn atr(&self) -> AtrValue;
    fn stochastic(&self) -> StochasticValue;

    /// Compute only the selected indicators.
    fn compute(&self, selection: &[SelectedIndicator]) -> IndicatorSet {
        let mut set = IndicatorSet::default();
        for selected in selection {
            match selected.indicator {
                IndicatorKind::Rsi => set.rsi = Some(self.rsi()),
                IndicatorKind::BollingerBands => set.bollinger_bands = Some(self.bollinger_bands()),
                IndicatorKind::Fibonacci => set.fibonacci = Some(self.fibonacci()),
                IndicatorKind::Volume => set.volume = Some(self.volume()),
                IndicatorKind::Macd => set.macd = Some(self.macd()),
                IndicatorKind::Atr => set.atr = Some(self.atr()),
                IndicatorKind::Stochastic => set.stochastic = Some(self.stochastic()),
            }
        }
        set
    }
}

/// Default source: approximations from a single snapshot.
pub struct SnapshotProxy<'a> {
    snapshot: &'a MarketSnapshot,
}

impl<'a> SnapshotProxy<'a> {
    pub fn new(snapshot: &'a MarketSnapshot) -> Self {
        Self { snapshot }
    }
}

impl IndicatorSource for SnapshotProxy<'_> {
    fn kind(&self) -> IndicatorSourceKind {
        IndicatorSourceKind::SnapshotProxy
    }

    fn rsi(&self) -> RsiValue {
        proxy::rsi(self.snapshot)
    }

    fn bollinger_bands(&self) -> BollingerValue {
        proxy::bollinger_bands(self.snapshot)
    }

    fn fibonacci(&self) -> FibonacciLevels {
        proxy::fibonacci(self.snapshot)
    }

    fn volume(&self) -> VolumeValue {
        proxy::volume(self.snapshot)
    }

    fn macd(&self) -> MacdValue {
        proxy::macd(self.snapshot)
    }

    fn atr(&self) -> AtrValue {
        proxy::atr(self.snapshot)
    }

    fn stochastic(&self) -> StochasticValue {
        proxy::stochastic(self.snapshot)
    }
}

/// Textbook indicators over a real OHLCV window (oldest bar first).
pub struct HistoricalSeries<'a> {
    bars: &'a [Bar],
    closes: Vec<f64>,
}

impl<'a> HistoricalSeries<'a> {
    pub fn new(bars: &'a [Bar]) -> Result<Self, AnalysisError> {
        if bars.len() < MIN_HISTORY_BARS {
            return Err(AnalysisError::InsufficientData(format!(
                "Need at least {} bars for series indicators, got {}",
                MIN_HISTORY_BARS,
                bars.len()
            )));
        }
        if bars.iter().any(|b| !b.close.is_finite() || b.close <= 0.0) {
            return Err(AnalysisError::InvalidData(
                "Series contains non-positive or non-finite closes".to_string(),
            ));
        }
        if bars
            .iter()
            .any(|b| ![b.open, b.high, b.low, b.close, b.volume].into_iter().all(is_bounded))
        {
            return Err(AnalysisError::InvalidData(
                "Series contains out-of-range prices or volumes".to_string(),
            ));
        }

        Ok(Self {
            bars,
            closes: bars.iter().map(|b| b.close).collect(),
        })
    }

    fn last_close(&self) -> f64 {
        self.closes[self.closes.len() - 1]
    }
}

impl IndicatorSource for HistoricalSeries<'_> {
    fn kind(&self) -> IndicatorSourceKind {
        IndicatorSourceKind::HistoricalSeries
    }

    fn rsi(&self) -> RsiValue {
        let value = indicators::rsi(&self.closes, RSI_PERIOD)
            .last()
            .copied()
            .unwrap_or(50.0);
        RsiValue { value }
    }

    fn bollinger_bands(&self) -> BollingerValue {
        let bb = indicators::bollinger_bands(&self.closes, BB_PERIOD, BB_STD_DEV);
        let price = self.last_close();
        let (upper, middle, lower) = match (bb.upper.last(), bb.middle.last(), bb.lower.last()) {
            (Some(&u), Some(&m), Some(&l)) => (u, m, l),
            _ => (price, price, price),
        };

        BollingerValue {
            upper,
            middle,
            lower,
            percent_b: ratio_or(price - lower, upper - lower, 0.5),
            bandwidth: ratio_or(upper - lower, middle, 0.0),
        }
    }

    fn fibonacci(&self) -> FibonacciLevels {
        let window = &self.bars[self.bars.len().saturating_sub(FIB_LOOKBACK)..];
        let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        FibonacciLevels::from_range(low, high)
    }

    fn volume(&self) -> VolumeValue {
        let n = self.bars.len();
        let current = self.bars[n - 1].volume;
        let prior: Vec<f64> = self.bars[n.saturating_sub(VOLUME_LOOKBACK + 1)..n - 1]
            .iter()
            .map(|b| b.volume)
            .collect();
        let average = mean(&prior);
        let ratio = ratio_or(current, average, 1.0);

        VolumeValue {
            current,
            average,
            ratio,
            trend: VolumeTrend::from_ratio(ratio),
        }
    }

    fn macd(&self) -> MacdValue {
        let result = indicators::macd(&self.closes, 12, 26, 9);
        let macd = result.macd_line.last().copied().unwrap_or(0.0);
        let signal = result.signal_line.last().copied().unwrap_or(macd);
        let histogram = result.histogram.last().copied().unwrap_or(0.0);

        MacdValue {
            macd,
            signal,
            histogram,
            // Real histograms are in price units; only the sign is comparable across symbols.
            trend: proxy::macd_trend(histogram, 0.0),
        }
    }

    fn atr(&self) -> AtrValue {
        let value = indicators::atr(self.bars, ATR_PERIOD)
            .last()
            .copied()
            .unwrap_or(0.0);
        let percent = ratio_or(value, self.last_close(), 0.0) * 100.0;

        AtrValue {
            value,
            percent,
            volatility: VolatilityTier::from_atr_percent(percent),
        }
    }

    fn stochastic(&self) -> StochasticValue {
        let result = indicators::stochastic(self.bars, STOCH_K, STOCH_D);
        let k = result.k.last().copied().unwrap_or(50.0);
        let d = result.d.last().copied().unwrap_or(k);

        StochasticValue {
            k,
            d,
            signal: StochasticSignal::from_k(k),
        }
    }
}

/// Pick the source for one call: the series when one is supplied and usable,
/// otherwise the snapshot proxies.
pub fn select_source<'a>(
    snapshot: &'a MarketSnapshot,
    history: Option<&'a [Bar]>,
) -> Box<dyn IndicatorSource + 'a> {
    match history.map(HistoricalSeries::new) {
        Some(Ok(series)) => Box::new(series),
        Some(Err(e)) => {
            tracing::warn!(
                "{}: falling back to snapshot proxies ({})",
                snapshot.symbol,
                e
            );
            Box::new(SnapshotProxy::new(snapshot))
        }
        None => Box::new(SnapshotProxy::new(snapshot)),
    }
}
