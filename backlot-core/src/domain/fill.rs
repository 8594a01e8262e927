use super::ids::{OrderId, PositionKey};
use super::order::OrderSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The realized outcome of an order executed against a price bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub position_key: PositionKey,
    pub timestamp: DateTime<Utc>,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: f64,
    pub commission: f64,
}

impl Fill {
    /// Gross notional of the fill, before commission.
    pub fn gross_amount(&self) -> f64 {
        self.price * self.quantity
    }
}
