//! Signal pipeline: fetch candles, score the latest bar, notify.
//!
//! Collaborators are injected as port trait objects so the same pipeline
//! runs against CSV files in the binary and in-memory mocks in tests.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::domain::candle::{validate_series, Candle};
use crate::domain::config::{PipelineConfig, StrategyParams};
use crate::domain::error::SigbenchError;
use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::performance::PerformanceTracker;
use crate::domain::risk::{RiskAdjuster, RiskAdjustment};
use crate::domain::signal::{compose_signal, Direction, Signal};
use crate::domain::simulator::simulate_trade;
use crate::domain::walk_forward::walk_forward;
use crate::ports::data_port::{HistoricalDataPort, TimeRange};
use crate::ports::notify_port::NotificationPort;
use crate::ports::prediction_port::{Prediction, PredictionPort};

/// Everything the pipeline derived for the latest bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub snapshot: IndicatorSnapshot,
    pub signal: Signal,
    pub adjustment: RiskAdjustment,
    pub prediction: Option<Prediction>,
    /// Final direction after blending with the prediction, if any.
    pub direction: Direction,
    /// Final confidence in [0, 1].
    pub confidence: f64,
}

/// Blend a rule-based call with a model prediction.
///
/// Both are mapped onto [-1, 1] (sign from direction, magnitude from
/// confidence) and mixed linearly; `weight` is the prediction's share.
pub fn blend(
    direction: Direction,
    confidence: f64,
    prediction: &Prediction,
    weight: f64,
) -> (Direction, f64) {
    let rule = direction.sign() * confidence;
    let model = prediction.direction.sign() * prediction.confidence.clamp(0.0, 1.0);
    let mixed = (1.0 - weight) * rule + weight * model;
    if !mixed.is_finite() || mixed == 0.0 {
        return (Direction::Neutral, 0.0);
    }
    let direction = if mixed > 0.0 { Direction::Long } else { Direction::Short };
    (direction, mixed.abs().min(1.0))
}

pub struct SignalPipeline<'a> {
    data: &'a dyn HistoricalDataPort,
    notifier: Option<&'a dyn NotificationPort>,
    predictor: Option<&'a dyn PredictionPort>,
    adjuster: RiskAdjuster,
    config: PipelineConfig,
}

impl<'a> SignalPipeline<'a> {
    pub fn new(data: &'a dyn HistoricalDataPort) -> Self {
        SignalPipeline {
            data,
            notifier: None,
            predictor: None,
            adjuster: RiskAdjuster::new(),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: &'a dyn NotificationPort) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_predictor(mut self, predictor: &'a dyn PredictionPort) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn adjuster(&self) -> &RiskAdjuster {
        &self.adjuster
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: &str,
        range: TimeRange,
    ) -> Result<Vec<Candle>, SigbenchError> {
        let candles = self.data.get(symbol, interval, range)?;
        debug!(symbol, interval, bars = candles.len(), "fetched candles");
        if candles.is_empty() {
            return Err(SigbenchError::NoData {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
            });
        }
        validate_series(&candles)?;
        Ok(candles)
    }

    /// Fetch a series, score its latest bar and send a notification.
    ///
    /// A failing notifier is logged and does not fail the run.
    pub fn run(
        &mut self,
        symbol: &str,
        interval: &str,
        range: TimeRange,
    ) -> Result<PipelineOutcome, SigbenchError> {
        let candles = self.fetch(symbol, interval, range)?;
        let outcome = self.evaluate(&candles)?;

        info!(
            symbol,
            interval,
            direction = %outcome.direction,
            confidence = outcome.confidence,
            "signal computed"
        );

        if let Some(notifier) = self.notifier {
            let message = format!(
                "{} {} {} confidence {:.3}",
                symbol, interval, outcome.direction, outcome.confidence
            );
            if let Err(e) = notifier.notify(&message) {
                warn!(symbol, error = %e, "notification failed");
            }
        }

        Ok(outcome)
    }

    /// Score the latest bar of an already loaded series.
    pub fn evaluate(&mut self, candles: &[Candle]) -> Result<PipelineOutcome, SigbenchError> {
        if candles.is_empty() {
            return Err(SigbenchError::InsufficientHistory { bars: 0, minimum: 1 });
        }
        validate_series(candles)?;

        let snapshot = IndicatorSnapshot::compute(candles);
        let signal = compose_signal(&snapshot);
        let adjustment = self.adjuster.adjust(signal.confidence, candles);

        let prediction = match self.predictor {
            Some(predictor) => match predictor.predict(&snapshot) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(error = %e, "prediction unavailable, using rule-based signal");
                    None
                }
            },
            None => None,
        };

        let (direction, confidence) = match &prediction {
            Some(p) if self.config.prediction_weight > 0.0 => blend(
                signal.direction,
                adjustment.adjusted_confidence,
                p,
                self.config.prediction_weight,
            ),
            _ => (signal.direction, adjustment.adjusted_confidence),
        };

        Ok(PipelineOutcome {
            snapshot,
            signal,
            adjustment,
            prediction,
            direction,
            confidence,
        })
    }

    /// Walk forward through a fetched series, trading each qualifying signal
    /// on the bars that follow it, and return the resulting ledger.
    ///
    /// The walk keeps its own risk adjuster so the live regime history is
    /// untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn backtest(
        &self,
        symbol: &str,
        interval: &str,
        range: TimeRange,
        strategy: &StrategyParams,
        initial_balance: f64,
        risk_free_rate: f64,
        seed: u64,
    ) -> Result<PerformanceTracker, SigbenchError> {
        let candles = self.fetch(symbol, interval, range)?;
        let minimum = strategy.warmup_bars + 2;
        if candles.len() < minimum {
            return Err(SigbenchError::InsufficientHistory {
                bars: candles.len(),
                minimum,
            });
        }

        let mut tracker = PerformanceTracker::new(initial_balance, risk_free_rate);
        walk_forward(
            &candles,
            strategy,
            initial_balance,
            &mut StdRng::seed_from_u64(seed),
            |request, path, rng| simulate_trade(request, path, rng),
            |_, outcome, _| {
                let filled = outcome.is_some();
                tracker.record(outcome.cloned());
                if filled {
                    tracker.evaluate();
                }
            },
        );

        info!(
            symbol,
            interval,
            trades = tracker.trades().len(),
            rejected = tracker.rejected(),
            "backtest finished"
        );
        Ok(tracker)
    }
}
