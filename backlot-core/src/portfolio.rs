//! Portfolio aggregation: cash, position ledgers, trade history, snapshots.
//!
//! The aggregator owns the money. Orders flow in, get priced by the
//! execution simulator, pass a feasibility gate, and land on a ledger;
//! everything the run produced (fills, trades, snapshots) accumulates here
//! in submission order. Feasibility rejections have zero side effects on
//! cash and ledgers. Cash can never go negative: buys are gated against the
//! actual fill cost including commission.

use crate::config::{ConfigError, SimConfig};
use crate::domain::{
    Bar, CompletedTrade, Fill, Order, OrderKind, OrderSide, PortfolioSnapshot, PositionKey,
    ValidationError,
};
use crate::execution::ExecutionSimulator;
use crate::ledger::{PositionLedger, QTY_EPSILON};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run-level order flow counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub orders_submitted: u64,
    pub orders_filled: u64,
    pub orders_rejected: u64,
    pub commission_paid: f64,
}

/// Read-only state handed to strategy code.
///
/// Strategies size and decide against this view; they never touch the
/// aggregator directly, so no strategy can mutate cash or ledgers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioView {
    pub cash: f64,
    pub total_value: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    /// Signed net quantity per open position key.
    pub positions: BTreeMap<PositionKey, f64>,
    pub pending_orders: usize,
}

impl PortfolioView {
    /// Signed quantity for a key, zero when no ledger is open for it.
    pub fn quantity(&self, key: &PositionKey) -> f64 {
        self.positions.get(key).copied().unwrap_or(0.0)
    }

    pub fn is_flat(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Cash plus ledgers plus run history for one simulation.
///
/// Ledger map is ordered by key so every aggregate sum runs in a fixed
/// order; two runs over identical inputs produce bit-identical history.
#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    config: SimConfig,
    simulator: ExecutionSimulator,
    cash: f64,
    ledgers: BTreeMap<PositionKey, PositionLedger>,
    /// Realized P&L carried over from ledgers removed after flattening.
    realized_closed: f64,
    pending: Vec<Order>,
    fills: Vec<Fill>,
    trades: Vec<CompletedTrade>,
    snapshots: Vec<PortfolioSnapshot>,
    stats: ExecutionStats,
}

impl PortfolioAggregator {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let simulator = ExecutionSimulator::new(config.slippage_rate, config.commission_rate)?;
        Ok(Self {
            cash: config.initial_capital,
            simulator,
            config,
            ledgers: BTreeMap::new(),
            realized_closed: 0.0,
            pending: Vec::new(),
            fills: Vec::new(),
            trades: Vec::new(),
            snapshots: Vec::new(),
            stats: ExecutionStats::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn open_positions(&self) -> usize {
        self.ledgers.len()
    }

    pub fn ledger(&self, key: &PositionKey) -> Option<&PositionLedger> {
        self.ledgers.get(key)
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn trades(&self) -> &[CompletedTrade] {
        &self.trades
    }

    pub fn snapshots(&self) -> &[PortfolioSnapshot] {
        &self.snapshots
    }

    pub fn pending_orders(&self) -> &[Order] {
        &self.pending
    }

    pub fn stats(&self) -> ExecutionStats {
        self.stats
    }

    /// Realized P&L across open ledgers and already-removed ones.
    pub fn realized_pnl(&self) -> f64 {
        self.realized_closed
            + self
                .ledgers
                .values()
                .map(PositionLedger::realized_pnl)
                .sum::<f64>()
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.ledgers
            .values()
            .map(|ledger| ledger.unrealized_pnl(price))
            .sum()
    }

    /// Cash plus signed market value of every open ledger at `price`.
    pub fn total_value(&self, price: f64) -> f64 {
        self.cash
            + self
                .ledgers
                .values()
                .map(|ledger| ledger.market_value(price))
                .sum::<f64>()
    }

    /// Submit an order against the current bar.
    ///
    /// Market orders fill or are rejected on this bar. Limit orders that the
    /// bar's range does not reach are queued and retried by
    /// [`poll_pending`](Self::poll_pending) on later bars. Returns the trade
    /// the fill closed, if any; a queued or rejected order returns `None`
    /// with no effect on cash or ledgers.
    pub fn submit(
        &mut self,
        order: Order,
        bar: &Bar,
    ) -> Result<Option<CompletedTrade>, ValidationError> {
        order.validate()?;
        self.stats.orders_submitted += 1;

        match self.simulator.fill(&order, bar) {
            Some(fill) => {
                if self.is_feasible(&fill, bar) {
                    Ok(self.apply_fill(&fill))
                } else {
                    self.stats.orders_rejected += 1;
                    Ok(None)
                }
            }
            None => {
                // Only a limit order can miss its bar; keep it working.
                debug_assert!(matches!(order.kind, OrderKind::Limit { .. }));
                self.pending.push(order);
                Ok(None)
            }
        }
    }

    /// Retry every pending limit order against a new bar.
    ///
    /// Orders that fill (and pass feasibility) leave the queue; the rest
    /// stay pending, including ones that reached their price but were not
    /// affordable this bar. Returns the trades closed by the fills.
    pub fn poll_pending(&mut self, bar: &Bar) -> Vec<CompletedTrade> {
        let mut closed = Vec::new();
        let mut still_pending = Vec::new();

        for order in std::mem::take(&mut self.pending) {
            match self.simulator.fill(&order, bar) {
                Some(fill) if self.is_feasible(&fill, bar) => {
                    if let Some(trade) = self.apply_fill(&fill) {
                        closed.push(trade);
                    }
                }
                _ => still_pending.push(order),
            }
        }

        self.pending = still_pending;
        closed
    }

    /// Compute the snapshot for a bar without recording it.
    ///
    /// Every ledger is marked at the same `bar.close`: position keys
    /// partition exposure on a single instrument, they do not address
    /// different instruments.
    pub fn snapshot_at(&self, bar: &Bar) -> PortfolioSnapshot {
        PortfolioSnapshot {
            timestamp: bar.timestamp,
            total_value: self.total_value(bar.close),
            cash: self.cash,
            realized_pnl: self.realized_pnl(),
            unrealized_pnl: self.unrealized_pnl(bar.close),
            open_positions: self.ledgers.len(),
            total_trades: self.trades.len(),
        }
    }

    /// Record the per-bar snapshot. History stays timestamp-ordered because
    /// bars are validated strictly increasing before the run.
    pub fn record_snapshot(&mut self, bar: &Bar) -> PortfolioSnapshot {
        let snapshot = self.snapshot_at(bar);
        if let Some(last) = self.snapshots.last() {
            debug_assert!(last.timestamp < snapshot.timestamp);
        }
        self.snapshots.push(snapshot.clone());
        snapshot
    }

    /// Read-only view for strategy code, priced at the bar close.
    pub fn view(&self, bar: &Bar) -> PortfolioView {
        PortfolioView {
            cash: self.cash,
            total_value: self.total_value(bar.close),
            realized_pnl: self.realized_pnl(),
            unrealized_pnl: self.unrealized_pnl(bar.close),
            positions: self
                .ledgers
                .iter()
                .map(|(key, ledger)| (key.clone(), ledger.quantity()))
                .collect(),
            pending_orders: self.pending.len(),
        }
    }

    /// Restore the initial state for another run over the same configuration.
    pub fn reset(&mut self) {
        self.cash = self.config.initial_capital;
        self.ledgers.clear();
        self.realized_closed = 0.0;
        self.pending.clear();
        self.fills.clear();
        self.trades.clear();
        self.snapshots.clear();
        self.stats = ExecutionStats::default();
    }

    /// Gate a priced fill against cash, position-count, notional and
    /// shorting limits. Pure check: no state is touched.
    fn is_feasible(&self, fill: &Fill, bar: &Bar) -> bool {
        let notional = fill.price * fill.quantity;
        match fill.side {
            OrderSide::Buy => {
                if notional + fill.commission > self.cash {
                    return false;
                }
                let opens_new_ledger = !self.ledgers.contains_key(&fill.position_key);
                if opens_new_ledger && self.ledgers.len() >= self.config.max_positions {
                    return false;
                }
                notional <= self.config.max_position_fraction * self.total_value(bar.close)
            }
            OrderSide::Sell => {
                let held = self
                    .ledgers
                    .get(&fill.position_key)
                    .map(PositionLedger::quantity)
                    .unwrap_or(0.0);
                if !self.config.allow_shorting {
                    // Without shorting, a sell may not exceed held long exposure.
                    return held > 0.0 && fill.quantity <= held + QTY_EPSILON;
                }
                // Closing held long exposure is always feasible; the limits
                // gate only the portion that opens or extends a short.
                let short_qty = (fill.quantity - held.max(0.0)).max(0.0);
                if short_qty <= QTY_EPSILON {
                    return true;
                }
                let opens_new_ledger = !self.ledgers.contains_key(&fill.position_key);
                if opens_new_ledger && self.ledgers.len() >= self.config.max_positions {
                    return false;
                }
                fill.price * short_qty
                    <= self.config.max_position_fraction * self.total_value(bar.close)
            }
        }
    }

    /// Move money, route the fill to its ledger, drop the ledger if it went
    /// flat. Assumes feasibility already passed.
    fn apply_fill(&mut self, fill: &Fill) -> Option<CompletedTrade> {
        match fill.side {
            OrderSide::Buy => self.cash -= fill.price * fill.quantity + fill.commission,
            OrderSide::Sell => self.cash += fill.price * fill.quantity - fill.commission,
        }
        debug_assert!(self.cash >= -1e-6);

        let ledger = self
            .ledgers
            .entry(fill.position_key.clone())
            .or_insert_with(|| PositionLedger::new(fill.position_key.clone()));
        let trade = ledger.apply_fill(fill);

        if ledger.is_flat() {
            self.realized_closed += ledger.realized_pnl();
            self.ledgers.remove(&fill.position_key);
        }

        self.stats.orders_filled += 1;
        self.stats.commission_paid += fill.commission;
        self.fills.push(fill.clone());

        if let Some(trade) = trade {
            self.trades.push(trade.clone());
            return Some(trade);
        }
        None
    }
}
