//! Signal composition: weighted blend of trend, momentum, volume and
//! volatility components into a direction and a confidence in [0, 1].

use std::fmt;

use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::stats::unit_clamp;

pub const TREND_WEIGHT: f64 = 0.30;
pub const MOMENTUM_WEIGHT: f64 = 0.30;
pub const VOLUME_WEIGHT: f64 = 0.20;
pub const VOLATILITY_WEIGHT: f64 = 0.20;

const RSI_VOTE: f64 = 0.3;
const MACD_VOTE: f64 = 0.4;
const STOCH_VOTE: f64 = 0.3;
/// Minimum margin between long and short votes for momentum to pick a side.
const VOTE_MARGIN: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

impl Direction {
    /// +1 for long, -1 for short, 0 for neutral.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
            Direction::Neutral => 0.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    pub value: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub trend: Component,
    pub momentum: Component,
    pub volume: Component,
    pub volatility: Component,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub direction: Direction,
    pub confidence: f64,
    pub components: ComponentScores,
}

fn finite(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn trend_component(snap: &IndicatorSnapshot) -> Component {
    let strength = finite(snap.trend_strength).clamp(0.0, 1.0);
    let adx = unit_clamp(finite(snap.adx) / 100.0);
    let direction = if snap.ema_fast > snap.ema_slow {
        Direction::Long
    } else {
        Direction::Short
    };
    Component {
        value: unit_clamp((strength + adx) / 2.0),
        direction,
    }
}

/// Adds `weight` to the long or short tally depending on which side of
/// `midpoint` the reading falls; exactly at the midpoint it abstains.
fn vote(reading: f64, midpoint: f64, weight: f64, long: &mut f64, short: &mut f64) {
    if reading > midpoint {
        *long += weight;
    } else if reading < midpoint {
        *short += weight;
    }
}

fn momentum_component(snap: &IndicatorSnapshot) -> Component {
    let rsi_term = unit_clamp((finite(snap.rsi) - 50.0).abs() / 50.0);
    let macd_term = unit_clamp(finite(snap.macd.histogram).abs());
    let stoch_term = unit_clamp((finite(snap.stochastic.k) - 50.0).abs() / 50.0);

    let (mut long, mut short) = (0.0, 0.0);
    vote(snap.rsi, 50.0, RSI_VOTE, &mut long, &mut short);
    vote(snap.macd.histogram, 0.0, MACD_VOTE, &mut long, &mut short);
    vote(snap.stochastic.k, 50.0, STOCH_VOTE, &mut long, &mut short);

    let direction = if (long - short).abs() < VOTE_MARGIN {
        Direction::Neutral
    } else if long > short {
        Direction::Long
    } else {
        Direction::Short
    };

    Component {
        value: unit_clamp((rsi_term + macd_term + stoch_term) / 3.0),
        direction,
    }
}

fn volume_component(snap: &IndicatorSnapshot) -> Component {
    let ratio = if snap.volume_trend.is_finite() { snap.volume_trend } else { 1.0 };
    Component {
        value: unit_clamp((ratio - 1.0).abs().min(1.0)),
        direction: if ratio > 1.0 { Direction::Long } else { Direction::Short },
    }
}

fn volatility_component(snap: &IndicatorSnapshot) -> Component {
    Component {
        value: unit_clamp(1.0 - finite(snap.historical_volatility) * 10.0),
        direction: Direction::Neutral,
    }
}

/// Compose a signal from an indicator snapshot.
///
/// The signal only takes a side when the trend and momentum components agree.
pub fn compose_signal(snap: &IndicatorSnapshot) -> Signal {
    let components = ComponentScores {
        trend: trend_component(snap),
        momentum: momentum_component(snap),
        volume: volume_component(snap),
        volatility: volatility_component(snap),
    };

    let confidence = unit_clamp(
        TREND_WEIGHT * components.trend.value
            + MOMENTUM_WEIGHT * components.momentum.value
            + VOLUME_WEIGHT * components.volume.value
            + VOLATILITY_WEIGHT * components.volatility.value,
    );

    let direction = if components.trend.direction == components.momentum.direction {
        components.trend.direction
    } else {
        Direction::Neutral
    };

    Signal {
        direction,
        confidence,
        components,
    }
}
