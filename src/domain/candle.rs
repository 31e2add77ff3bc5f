//! OHLCV candle representation.

use chrono::NaiveDateTime;

use super::error::SigbenchError;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Check that a series is usable as pipeline input: finite prices,
/// non-negative volume, strictly increasing timestamps.
pub fn validate_series(candles: &[Candle]) -> Result<(), SigbenchError> {
    for (i, candle) in candles.iter().enumerate() {
        if !candle.is_finite() {
            return Err(SigbenchError::InvalidSeries {
                index: i,
                reason: "non-finite price or volume".into(),
            });
        }
        if candle.volume < 0.0 {
            return Err(SigbenchError::InvalidSeries {
                index: i,
                reason: format!("negative volume {}", candle.volume),
            });
        }
        if i > 0 && candle.timestamp <= candles[i - 1].timestamp {
            return Err(SigbenchError::InvalidSeries {
                index: i,
                reason: format!(
                    "timestamp {} is not after {}",
                    candle.timestamp,
                    candles[i - 1].timestamp
                ),
            });
        }
    }
    Ok(())
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
