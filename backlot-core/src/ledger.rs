//! Position ledger — signed-quantity exposure with weighted-average cost basis.
//!
//! One ledger per position key. Fills mutate the ledger through a closed set
//! of transitions (open, add, reduce, close, flip) and every reduction of
//! exposure emits a [`CompletedTrade`]. The ledger keeps an append-only log
//! of every fill it absorbed, with episode boundaries marking each
//! flat-to-open transition, so a run can be audited after the fact.

use crate::domain::{CompletedTrade, Fill, OrderSide, PositionKey, PositionSide};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quantities within this epsilon of each other are treated as equal, so a
/// sell matching held quantity closes the position instead of flipping it.
pub const QTY_EPSILON: f64 = 1e-9;

/// Marks where an episode (one flat-to-flat lifecycle) begins in the fill log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub open_time: DateTime<Utc>,
    /// Index of the episode's first fill in the ledger's fill log.
    pub fill_start: usize,
}

/// Running state for a single position key.
///
/// `quantity` is signed: positive long, negative short. `avg_entry_price` is
/// meaningful only while the ledger is non-flat; adds re-weight it, reductions
/// leave it untouched, and a flip resets it to the flipping fill's price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLedger {
    key: PositionKey,
    quantity: f64,
    avg_entry_price: f64,
    open_time: Option<DateTime<Utc>>,
    realized_pnl: f64,
    commission_paid: f64,
    fills: Vec<Fill>,
    episodes: Vec<Episode>,
}

impl PositionLedger {
    pub fn new(key: PositionKey) -> Self {
        Self {
            key,
            quantity: 0.0,
            avg_entry_price: 0.0,
            open_time: None,
            realized_pnl: 0.0,
            commission_paid: 0.0,
            fills: Vec::new(),
            episodes: Vec::new(),
        }
    }

    pub fn key(&self) -> &PositionKey {
        &self.key
    }

    /// Signed exposure: positive long, negative short, zero flat.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn avg_entry_price(&self) -> f64 {
        self.avg_entry_price
    }

    pub fn side(&self) -> PositionSide {
        PositionSide::from_quantity(self.quantity)
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.abs() < QTY_EPSILON
    }

    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        self.open_time
    }

    /// Gross realized P&L accumulated across all closes in this ledger.
    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    /// Total commission across every fill this ledger absorbed.
    pub fn commission_paid(&self) -> f64 {
        self.commission_paid
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Signed market value of the exposure at `price`.
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    /// Unrealized P&L at `price`. The signed form covers both directions:
    /// a short (negative quantity) gains as the price falls.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        if self.is_flat() {
            return 0.0;
        }
        self.quantity * (price - self.avg_entry_price)
    }

    /// Absorb a fill and emit the trade it closed, if any.
    ///
    /// At most one trade per fill: a reduction or close emits a record for
    /// the closed slice, a flip emits a record for the full prior exposure,
    /// an open or add emits nothing.
    pub fn apply_fill(&mut self, fill: &Fill) -> Option<CompletedTrade> {
        let delta = match fill.side {
            OrderSide::Buy => fill.quantity,
            OrderSide::Sell => -fill.quantity,
        };
        self.commission_paid += fill.commission;

        let trade = if self.is_flat() {
            self.open(fill, delta);
            None
        } else if self.quantity.signum() == delta.signum() {
            self.add(fill, delta);
            None
        } else {
            Some(self.reduce(fill, delta))
        };

        self.fills.push(fill.clone());
        trade
    }

    fn open(&mut self, fill: &Fill, delta: f64) {
        self.quantity = delta;
        self.avg_entry_price = fill.price;
        self.open_time = Some(fill.timestamp);
        self.episodes.push(Episode {
            open_time: fill.timestamp,
            fill_start: self.fills.len(),
        });
    }

    fn add(&mut self, fill: &Fill, delta: f64) {
        let held = self.quantity.abs();
        let added = delta.abs();
        self.avg_entry_price =
            (self.avg_entry_price * held + fill.price * added) / (held + added);
        self.quantity += delta;
    }

    /// Fill opposes the held direction: partial close, full close, or flip.
    fn reduce(&mut self, fill: &Fill, delta: f64) -> CompletedTrade {
        let held = self.quantity.abs();
        let incoming = delta.abs();
        let closed_qty = held.min(incoming);
        let direction = self.quantity.signum();
        let prior_side = self.side();
        let entry_price = self.avg_entry_price;
        // A long closes at (exit − entry); a short covers at (entry − exit).
        let realized = direction * (fill.price - entry_price) * closed_qty;
        self.realized_pnl += realized;

        // Closing commission share: the whole fill on a close or reduction,
        // pro-rata on a flip where part of the fill opens the new side.
        let commission = fill.commission * (closed_qty / fill.quantity);
        let entry_time = self.open_time.unwrap_or(fill.timestamp);

        let remainder = incoming - held;
        if remainder > QTY_EPSILON {
            // Flip: the excess opens a fresh episode in the other direction.
            let flipped = -direction * remainder;
            self.open(fill, flipped);
        } else if held - incoming > QTY_EPSILON {
            self.quantity += delta;
        } else {
            // Exact match within epsilon closes out entirely.
            self.quantity = 0.0;
            self.avg_entry_price = 0.0;
            self.open_time = None;
        }

        CompletedTrade {
            position_key: self.key.clone(),
            side: prior_side,
            entry_price,
            exit_price: fill.price,
            quantity: closed_qty,
            entry_time,
            exit_time: fill.timestamp,
            realized_pnl: realized,
            commission,
        }
    }
}
