#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sigbench::domain::candle::Candle;
use sigbench::domain::error::SigbenchError;
use sigbench::domain::indicator::IndicatorSnapshot;
use sigbench::domain::signal::Direction;
use sigbench::ports::data_port::{HistoricalDataPort, TimeRange};
use sigbench::ports::notify_port::NotificationPort;
use sigbench::ports::prediction_port::{Prediction, PredictionPort};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: RefCell<HashMap<(String, String), Vec<Candle>>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: RefCell::new(HashMap::new()),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_candles(self, symbol: &str, interval: &str, candles: Vec<Candle>) -> Self {
        self.data
            .borrow_mut()
            .insert((symbol.to_string(), interval.to_string()), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl HistoricalDataPort for MockDataPort {
    fn get(
        &self,
        symbol: &str,
        interval: &str,
        range: TimeRange,
    ) -> Result<Vec<Candle>, SigbenchError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SigbenchError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .borrow()
            .get(&(symbol.to_string(), interval.to_string()))
            .map(|candles| {
                candles
                    .iter()
                    .filter(|c| range.contains(c.timestamp))
                    .cloned()
                    .collect()
            })
            .ok_or_else(|| SigbenchError::NoData {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
            })
    }

    fn put(&self, symbol: &str, interval: &str, candles: &[Candle]) -> Result<(), SigbenchError> {
        self.data
            .borrow_mut()
            .insert((symbol.to_string(), interval.to_string()), candles.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, message: &str) -> Result<(), SigbenchError> {
        self.messages.borrow_mut().push(message.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FailingNotifier {
    pub attempts: Cell<usize>,
}

impl NotificationPort for FailingNotifier {
    fn notify(&self, _message: &str) -> Result<(), SigbenchError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(SigbenchError::Notification {
            reason: "webhook unreachable".into(),
        })
    }
}

pub struct FixedPredictor {
    pub prediction: Prediction,
    pub calls: Cell<usize>,
}

impl FixedPredictor {
    pub fn new(direction: Direction, confidence: f64) -> Self {
        Self {
            prediction: Prediction { direction, confidence },
            calls: Cell::new(0),
        }
    }
}

impl PredictionPort for FixedPredictor {
    fn predict(&self, _features: &IndicatorSnapshot) -> Result<Prediction, SigbenchError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.prediction)
    }
}

pub struct FailingPredictor;

impl PredictionPort for FailingPredictor {
    fn predict(&self, _features: &IndicatorSnapshot) -> Result<Prediction, SigbenchError> {
        Err(SigbenchError::Prediction {
            reason: "model not loaded".into(),
        })
    }
}

pub fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(i as i64)
}

pub fn candle(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle {
        timestamp: ts(i),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Candles whose OHLC all equal the close, volume 1000.
pub fn from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| candle(i, c, c, c, c, 1000.0))
        .collect()
}

/// `close[i] = 100 + i`.
pub fn monotonic(n: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
    from_closes(&closes)
}

pub fn flat(n: usize) -> Vec<Candle> {
    from_closes(&vec![100.0; n])
}

/// 50 stable bars at 100 followed by a 10% gap down.
pub fn shock() -> Vec<Candle> {
    let mut candles = flat(50);
    candles.push(candle(50, 90.0, 90.5, 89.5, 90.0, 1000.0));
    candles
}

/// Noisy uptrend with real ranges and varying volume.
pub fn wavy(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + x * 0.3 + (x * 0.7).sin() * 4.0;
            let open = close - (x * 1.3).cos();
            let high = close.max(open) + 1.0 + (x * 0.4).sin().abs();
            let low = close.min(open) - 1.0 - (x * 0.9).cos().abs();
            candle(i, open, high, low, close, 800.0 + (i % 7) as f64 * 120.0)
        })
        .collect()
}

pub fn write_file(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
