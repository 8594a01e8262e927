//! Order types and boundary validation.

use super::ids::{OrderId, PositionKey};
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Which way the order trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// What kind of order and its price parameters.
///
/// Closed set of variants: execution is an exhaustive match, so a new kind
/// fails to compile until every site handles it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Fill on the current bar at close, adjusted for slippage.
    Market,
    /// Fill at limit price or better; stays pending until the bar reaches it.
    Limit { limit_price: f64 },
}

/// A single order, immutable once constructed.
///
/// Quantity is in asset units (fractional allowed); lot-to-unit conversion
/// happens in the sizing layer before the order is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: f64,
    /// Ledger this order addresses; `None` resolves to the default key.
    pub position_key: Option<PositionKey>,
}

impl Order {
    pub fn market(id: OrderId, side: OrderSide, quantity: f64) -> Self {
        Self {
            id,
            side,
            kind: OrderKind::Market,
            quantity,
            position_key: None,
        }
    }

    pub fn limit(id: OrderId, side: OrderSide, quantity: f64, limit_price: f64) -> Self {
        Self {
            id,
            side,
            kind: OrderKind::Limit { limit_price },
            quantity,
            position_key: None,
        }
    }

    pub fn with_position_key(mut self, key: PositionKey) -> Self {
        self.position_key = Some(key);
        self
    }

    /// Resolve the addressed ledger key.
    pub fn resolved_key(&self) -> PositionKey {
        self.position_key
            .clone()
            .unwrap_or_else(PositionKey::default_key)
    }

    /// Boundary validation. The simulator and ledgers assume this has passed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity <= 0.0 || !self.quantity.is_finite() {
            return Err(ValidationError::NonPositiveQuantity(self.quantity));
        }
        match self.kind {
            OrderKind::Market => Ok(()),
            OrderKind::Limit { limit_price } => {
                if limit_price <= 0.0 || !limit_price.is_finite() {
                    Err(ValidationError::NonPositiveLimitPrice(limit_price))
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_order_validates() {
        let order = Order::market(OrderId(1), OrderSide::Buy, 100.0);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let order = Order::market(OrderId(1), OrderSide::Buy, 0.0);
        assert!(matches!(
            order.validate(),
            Err(ValidationError::NonPositiveQuantity(_))
        ));

        let order = Order::market(OrderId(2), OrderSide::Sell, -5.0);
        assert!(order.validate().is_err());
    }

    #[test]
    fn non_positive_limit_price_rejected() {
        let order = Order::limit(OrderId(1), OrderSide::Buy, 10.0, 0.0);
        assert!(matches!(
            order.validate(),
            Err(ValidationError::NonPositiveLimitPrice(_))
        ));
    }

    #[test]
    fn key_resolution_defaults() {
        let order = Order::market(OrderId(1), OrderSide::Buy, 1.0);
        assert_eq!(order.resolved_key(), PositionKey::default_key());

        let keyed = Order::market(OrderId(2), OrderSide::Buy, 1.0)
            .with_position_key(PositionKey::new("grid_3"));
        assert_eq!(keyed.resolved_key(), PositionKey::new("grid_3"));
    }

    #[test]
    fn order_serialization_roundtrip() {
        let order = Order::limit(OrderId(42), OrderSide::Sell, 50.0, 151.0)
            .with_position_key(PositionKey::new("swing"));
        let json = serde_json::to_string(&order).unwrap();
        let deser: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deser);
    }
}
