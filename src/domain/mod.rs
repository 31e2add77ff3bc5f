//! Core domain types and numeric pipeline.

pub mod candle;
pub mod stats;
pub mod indicator;
pub mod signal;
pub mod risk;
pub mod simulator;
pub mod metrics;
pub mod performance;
pub mod walk_forward;
pub mod montecarlo;
pub mod config;
pub mod settings;
pub mod pipeline;
pub mod error;
