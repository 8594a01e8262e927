//! CompletedTrade — a closed (or partially closed) round trip.

use super::ids::PositionKey;
use super::position::PositionSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record produced when a fill reduces prior exposure.
///
/// `entry_price` is the position's weighted average before the close;
/// `quantity` is the slice actually closed by the fill. A partial close emits
/// one record and leaves the position open; a flip emits one record for the
/// full prior exposure only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrade {
    pub position_key: PositionKey,
    /// Side of the opened leg (Long for a closed long, Short for a covered short).
    pub side: PositionSide,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    /// Gross realized P&L for this slice (price difference × quantity).
    pub realized_pnl: f64,
    /// Commission of the closing fill attributed to this slice (pro-rata on a flip).
    pub commission: f64,
}

impl CompletedTrade {
    pub fn net_pnl(&self) -> f64 {
        self.realized_pnl - self.commission
    }

    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.quantity == 0.0 {
            return 0.0;
        }
        self.realized_pnl / (self.entry_price * self.quantity)
    }

    pub fn is_winner(&self) -> bool {
        self.realized_pnl > 0.0
    }
}
