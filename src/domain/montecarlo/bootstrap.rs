//! Block bootstrap of candle series.
//!
//! Each historical bar is reduced to its shape relative to the previous
//! close. Random contiguous blocks of shapes are chained onto a running close,
//! so a resampled series keeps the local autocorrelation of the history and
//! never jumps between blocks.

use rand::Rng;

use crate::domain::candle::Candle;

/// One bar expressed as ratios to the previous close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarShape {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl BarShape {
    fn apply(&self, prev_close: f64, template: &Candle) -> Candle {
        Candle {
            timestamp: template.timestamp,
            open: prev_close * self.open,
            high: prev_close * self.high,
            low: prev_close * self.low,
            close: prev_close * self.close,
            volume: self.volume,
        }
    }
}

/// Shapes of bars 1..n; a non-positive previous close gives a flat bar.
pub fn bar_shapes(candles: &[Candle]) -> Vec<BarShape> {
    candles
        .windows(2)
        .map(|w| {
            let base = w[0].close;
            let bar = &w[1];
            if base > 0.0 {
                BarShape {
                    open: bar.open / base,
                    high: bar.high / base,
                    low: bar.low / base,
                    close: bar.close / base,
                    volume: bar.volume,
                }
            } else {
                BarShape {
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    volume: bar.volume,
                }
            }
        })
        .collect()
}

/// Resample `history` into a series of the same length.
///
/// The first bar is copied, then blocks of `block_size` consecutive shapes
/// (shorter when the history is) are drawn with replacement and chained.
/// Timestamps come from the history in order, so the result is a valid series.
pub fn block_bootstrap<R: Rng + ?Sized>(
    history: &[Candle],
    block_size: usize,
    rng: &mut R,
) -> Vec<Candle> {
    let Some(first) = history.first() else {
        return Vec::new();
    };
    let shapes = bar_shapes(history);
    let mut series = Vec::with_capacity(history.len());
    series.push(first.clone());
    if shapes.is_empty() {
        return series;
    }

    let block = block_size.clamp(1, shapes.len());
    let max_start = shapes.len() - block;

    while series.len() < history.len() {
        let start = rng.gen_range(0..=max_start);
        for shape in &shapes[start..start + block] {
            if series.len() == history.len() {
                break;
            }
            let prev_close = series[series.len() - 1].close;
            let template = &history[series.len()];
            series.push(shape.apply(prev_close, template));
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::validate_series;
    use crate::domain::indicator::test_bars::bar;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn history(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.4).sin() * 8.0 + i as f64 * 0.1;
                bar(i, c + 1.0, c - 1.0, c, 500.0 + i as f64)
            })
            .collect()
    }

    #[test]
    fn shapes_are_relative_to_previous_close() {
        let candles = vec![bar(0, 101.0, 99.0, 100.0, 1.0), bar(1, 112.0, 104.0, 110.0, 7.0)];
        let shapes = bar_shapes(&candles);
        assert_eq!(shapes.len(), 1);
        assert!((shapes[0].close - 1.1).abs() < 1e-12);
        assert!((shapes[0].high - 1.12).abs() < 1e-12);
        assert_eq!(shapes[0].volume, 7.0);
    }

    #[test]
    fn bootstrap_preserves_length_and_validity() {
        let hist = history(120);
        let mut rng = StdRng::seed_from_u64(3);
        let series = block_bootstrap(&hist, 20, &mut rng);
        assert_eq!(series.len(), hist.len());
        assert!(validate_series(&series).is_ok());
        assert_eq!(series[0], hist[0]);
    }

    #[test]
    fn bootstrap_chains_without_gaps() {
        // Bars whose open equals the previous close stay gap-free when resampled.
        let hist: Vec<Candle> = (0..60)
            .map(|i| {
                let prev = 100.0 + (i as f64 - 1.0).max(0.0);
                let c = 100.0 + i as f64;
                let mut candle = bar(i, c + 0.5, prev - 0.5, c, 100.0);
                candle.open = prev;
                candle
            })
            .collect();
        let series = block_bootstrap(&hist, 7, &mut StdRng::seed_from_u64(11));
        for w in series.windows(2) {
            assert!((w[1].open - w[0].close).abs() < 1e-9);
        }
    }

    #[test]
    fn bootstrap_is_seed_deterministic() {
        let hist = history(80);
        let a = block_bootstrap(&hist, 20, &mut StdRng::seed_from_u64(9));
        let b = block_bootstrap(&hist, 20, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn block_larger_than_history() {
        let hist = history(5);
        let series = block_bootstrap(&hist, 20, &mut StdRng::seed_from_u64(1));
        assert_eq!(series.len(), 5);
        // Only one block fits, so the shapes replay in order.
        for (a, b) in series.iter().zip(&hist) {
            assert!((a.close - b.close).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_history() {
        assert!(block_bootstrap(&[], 20, &mut StdRng::seed_from_u64(1)).is_empty());
    }
}
