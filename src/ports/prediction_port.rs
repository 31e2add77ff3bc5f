//! Alternate signal source, typically a trained model served elsewhere.

use crate::domain::error::SigbenchError;
use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::signal::Direction;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub direction: Direction,
    pub confidence: f64,
}

pub trait PredictionPort {
    fn predict(&self, features: &IndicatorSnapshot) -> Result<Prediction, SigbenchError>;
}
