//! PortfolioSnapshot — per-bar portfolio state, append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time portfolio state recorded once per processed bar.
///
/// Never mutated after creation. `total_value == cash + Σ position market
/// value` at the snapshot's price map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub timestamp: DateTime<Utc>,
    pub total_value: f64,
    pub cash: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub open_positions: usize,
    pub total_trades: usize,
}

impl PortfolioSnapshot {
    pub fn total_pnl(&self) -> f64 {
        self.realized_pnl + self.unrealized_pnl
    }
}
