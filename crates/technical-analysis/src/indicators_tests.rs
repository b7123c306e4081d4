#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use analysis_core::Bar;
    use chrono::Utc;

    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    fn long_prices() -> Vec<f64> {
        (0..60)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0 + i as f64 * 0.2)
            .collect()
    }

    fn sample_bars() -> Vec<Bar> {
        (0..15)
            .map(|i| {
                let open = 100.0 + i as f64;
                Bar {
                    timestamp: Utc::now() - chrono::Duration::days(15 - i as i64),
                    open,
                    high: open + 2.0,
                    low: open - 1.0,
                    close: open + 1.0,
                    volume: 1_000_000.0,
                    vwap: None,
                }
            })
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001);
        assert!((result[1] - 3.0).abs() < 0.001);
        assert!((result[2] - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_sma_insufficient_data() {
        assert!(sma(&[1.0, 2.0], 5).is_empty());
        assert!(sma(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let data = vec![22.0, 24.0, 23.0, 25.0, 26.0];
        let result = ema(&data, 3);

        assert_eq!(result.len(), 3);
        let first_sma = (22.0 + 24.0 + 23.0) / 3.0;
        assert!((result[0] - first_sma).abs() < 1e-9);
        // multiplier = 0.5
        assert!((result[1] - (25.0 - first_sma) * 0.5 - first_sma).abs() < 1e-9);
    }

    #[test]
    fn test_ema_increases_with_uptrend() {
        let data: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let result = ema(&data, 3);

        for pair in result.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_rsi_bounds() {
        let result = rsi(&sample_prices(), 14);

        assert_eq!(result.len(), 6);
        for &value in &result {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(rsi(&[1.0, 2.0, 3.0], 14).is_empty());
    }

    #[test]
    fn test_rsi_extremes() {
        let uptrend: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(*rsi(&uptrend, 14).last().unwrap(), 100.0);

        let flat = vec![100.0; 20];
        assert_eq!(*rsi(&flat, 14).last().unwrap(), 50.0);
    }

    #[test]
    fn test_macd_needs_slow_plus_signal() {
        let result = macd(&sample_prices(), 12, 26, 9);
        assert!(result.histogram.is_empty());

        let result = macd(&long_prices(), 12, 26, 9);
        assert_eq!(result.macd_line.len(), 60 - 26 + 1);
        assert_eq!(result.signal_line.len(), result.macd_line.len() - 9 + 1);
        assert_eq!(result.histogram.len(), result.signal_line.len());
    }

    #[test]
    fn test_macd_histogram_is_line_minus_signal() {
        let result = macd(&long_prices(), 12, 26, 9);
        let lag = result.macd_line.len() - result.signal_line.len();

        for (i, &hist) in result.histogram.iter().enumerate() {
            let expected = result.macd_line[i + lag] - result.signal_line[i];
            assert!((hist - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_macd_rejects_inverted_periods() {
        let result = macd(&long_prices(), 26, 12, 9);
        assert!(result.macd_line.is_empty());
    }

    #[test]
    fn test_bollinger_bands_ordering() {
        let result = bollinger_bands(&sample_prices(), 10, 2.0);

        assert_eq!(result.upper.len(), 11);
        for i in 0..result.upper.len() {
            assert!(result.upper[i] > result.middle[i]);
            assert!(result.middle[i] > result.lower[i]);
        }
    }

    #[test]
    fn test_bollinger_bands_collapse_on_constant_prices() {
        let result = bollinger_bands(&vec![100.0; 20], 10, 2.0);

        for i in 0..result.upper.len() {
            assert_eq!(result.upper[i], result.lower[i]);
        }
    }

    #[test]
    fn test_atr_basic() {
        let result = atr(&sample_bars(), 5);

        assert_eq!(result.len(), 10);
        // every true range is high-low = 3 or a gap of 3 from the prior close
        for &value in &result {
            assert!((value - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_atr_insufficient_data() {
        let bars = sample_bars()[..5].to_vec();
        assert!(atr(&bars, 14).is_empty());
    }

    #[test]
    fn test_atr_increases_with_volatility() {
        let normal_atr = atr(&sample_bars(), 5);

        let mut volatile_bars = sample_bars();
        for bar in &mut volatile_bars {
            bar.high += 10.0;
            bar.low -= 10.0;
        }
        let volatile_atr = atr(&volatile_bars, 5);

        assert!(volatile_atr[0] > normal_atr[0]);
    }

    #[test]
    fn test_stochastic_bounds() {
        let result = stochastic(&sample_bars(), 14, 3);

        assert_eq!(result.k.len(), 2);
        assert!(result.d.is_empty());
        for &value in &result.k {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_stochastic_insufficient_data() {
        let bars = sample_bars()[..5].to_vec();
        assert!(stochastic(&bars, 14, 3).k.is_empty());
    }
}
