//! Historical candle storage port.

use chrono::NaiveDateTime;

use crate::domain::candle::Candle;
use crate::domain::error::SigbenchError;

/// Inclusive timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        TimeRange { start, end }
    }

    /// Range covering every representable timestamp.
    pub fn all() -> Self {
        TimeRange {
            start: NaiveDateTime::MIN,
            end: NaiveDateTime::MAX,
        }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

pub trait HistoricalDataPort {
    /// Candles for `symbol` at `interval` within `range`, oldest first.
    fn get(
        &self,
        symbol: &str,
        interval: &str,
        range: TimeRange,
    ) -> Result<Vec<Candle>, SigbenchError>;

    /// Store `candles`, replacing any existing series for `symbol` at `interval`.
    fn put(&self, symbol: &str, interval: &str, candles: &[Candle]) -> Result<(), SigbenchError>;
}
