//! Single-trade simulation against a forward price path.
//!
//! A proposed trade is walked bar by bar until its stop or target is touched.
//! Within a bar the stop is checked first, so a bar that spans both levels
//! resolves as a loss. A trade that survives the whole path is marked out at
//! the final close.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use rand::Rng;
use tracing::debug;

use crate::domain::candle::Candle;
use crate::domain::signal::Direction;

pub const REPLAY_CAPACITY: usize = 10_000;
pub const MIN_SLIPPAGE_FRACTION: f64 = 0.0001;
pub const MAX_SLIPPAGE_FRACTION: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeStatus {
    /// Entered, neither level hit before the path ended.
    Filled,
    /// Exited at the take-profit level.
    Closed,
    /// Exited at the stop-loss level.
    Stopped,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Filled => write!(f, "FILLED"),
            TradeStatus::Closed => write!(f, "CLOSED"),
            TradeStatus::Stopped => write!(f, "STOPPED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeRequest {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub size: f64,
    pub confidence: f64,
}

impl TradeRequest {
    /// Whether the request describes a trade that can be entered at all.
    pub fn is_valid(&self) -> bool {
        let numbers = [
            self.entry_price,
            self.stop_loss,
            self.take_profit,
            self.size,
            self.confidence,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return false;
        }
        if self.size <= 0.0 || self.entry_price <= 0.0 {
            return false;
        }
        match self.direction {
            Direction::Long => {
                self.stop_loss < self.entry_price && self.take_profit > self.entry_price
            }
            Direction::Short => {
                self.stop_loss > self.entry_price && self.take_profit < self.entry_price
            }
            Direction::Neutral => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedTrade {
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub size: f64,
    pub confidence: f64,
    pub pnl: f64,
    pub status: TradeStatus,
    /// Signed against the trade: positive for longs, negative for shorts.
    pub slippage: f64,
    pub open_time: NaiveDateTime,
    pub close_time: NaiveDateTime,
    pub bars_held: usize,
}

impl SimulatedTrade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    /// Whether the raw price move, before slippage, went the trade's way.
    pub fn direction_correct(&self) -> bool {
        self.direction.sign() * (self.exit_price - self.entry_price) > 0.0
    }

    /// Return on the capital committed at entry.
    pub fn return_on_notional(&self) -> f64 {
        let notional = self.entry_price * self.size;
        if notional > 0.0 { self.pnl / notional } else { 0.0 }
    }
}

/// Where a trade leaves the path: status, exit price, index of the exit bar.
pub fn resolve_exit(
    direction: Direction,
    stop_loss: f64,
    take_profit: f64,
    path: &[Candle],
) -> Option<(TradeStatus, f64, usize)> {
    for (i, bar) in path.iter().enumerate() {
        match direction {
            Direction::Long => {
                if bar.low <= stop_loss {
                    return Some((TradeStatus::Stopped, stop_loss, i));
                }
                if bar.high >= take_profit {
                    return Some((TradeStatus::Closed, take_profit, i));
                }
            }
            Direction::Short => {
                if bar.high >= stop_loss {
                    return Some((TradeStatus::Stopped, stop_loss, i));
                }
                if bar.low <= take_profit {
                    return Some((TradeStatus::Closed, take_profit, i));
                }
            }
            Direction::Neutral => return None,
        }
    }
    path.last()
        .map(|bar| (TradeStatus::Filled, bar.close, path.len() - 1))
}

/// Bounded FIFO of simulated trades shared between threads.
#[derive(Debug)]
pub struct ReplayBuffer {
    trades: Mutex<VecDeque<SimulatedTrade>>,
    capacity: usize,
}

impl Default for ReplayBuffer {
    fn default() -> Self {
        ReplayBuffer::new(REPLAY_CAPACITY)
    }
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        ReplayBuffer {
            trades: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<SimulatedTrade>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.trades.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, trade: SimulatedTrade) {
        let mut trades = self.lock();
        if trades.len() >= self.capacity {
            trades.pop_front();
            debug!(capacity = self.capacity, "replay buffer full, evicted oldest trade");
        }
        trades.push_back(trade);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the buffered trades, oldest first.
    pub fn snapshot(&self) -> Vec<SimulatedTrade> {
        self.lock().iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TradeSimulator {
    replay: Arc<ReplayBuffer>,
}

impl TradeSimulator {
    pub fn new(replay: Arc<ReplayBuffer>) -> Self {
        TradeSimulator { replay }
    }

    pub fn replay(&self) -> &Arc<ReplayBuffer> {
        &self.replay
    }

    /// Resolve `request` against `path`, drawing slippage from `rng`.
    ///
    /// Returns `None` when the request is not a valid trade or the path is
    /// empty. Every simulated trade is also appended to the replay buffer.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        request: &TradeRequest,
        path: &[Candle],
        rng: &mut R,
    ) -> Option<SimulatedTrade> {
        let trade = simulate_trade(request, path, rng)?;
        self.replay.push(trade.clone());
        Some(trade)
    }
}

/// Simulation without the replay buffer, for callers that keep their own ledger.
pub fn simulate_trade<R: Rng + ?Sized>(
    request: &TradeRequest,
    path: &[Candle],
    rng: &mut R,
) -> Option<SimulatedTrade> {
    if !request.is_valid() {
        return None;
    }
    let first = path.first()?;
    let (status, exit_price, exit_index) =
        resolve_exit(request.direction, request.stop_loss, request.take_profit, path)?;

    let sign = request.direction.sign();
    let slippage =
        sign * rng.gen_range(MIN_SLIPPAGE_FRACTION..=MAX_SLIPPAGE_FRACTION) * request.entry_price;
    let pnl = sign * (exit_price - request.entry_price - slippage) * request.size;

    Some(SimulatedTrade {
        direction: request.direction,
        entry_price: request.entry_price,
        exit_price,
        stop_loss: request.stop_loss,
        take_profit: request.take_profit,
        size: request.size,
        confidence: request.confidence,
        pnl,
        status,
        slippage,
        open_time: first.timestamp,
        close_time: path[exit_index].timestamp,
        bars_held: exit_index + 1,
    })
}
