//! Order execution simulation against a single bar.
//!
//! Market orders always fill at the bar close adjusted against the trader by
//! slippage. Limit orders fill only when the bar's range reaches the limit
//! price, at the better of limit and close, with no slippage (passive fill).
//! Commission applies to every fill. The simulator is stateless and
//! deterministic: identical order + bar always produce an identical result,
//! and it never errors — an unfillable order is `None`, not a failure.

use crate::config::ConfigError;
use crate::domain::{Bar, Fill, Order, OrderKind, OrderSide};

/// Fill/no-fill decision engine with slippage and commission friction.
#[derive(Debug, Clone)]
pub struct ExecutionSimulator {
    slippage_rate: f64,
    commission_rate: f64,
}

impl ExecutionSimulator {
    pub fn new(slippage_rate: f64, commission_rate: f64) -> Result<Self, ConfigError> {
        if slippage_rate < 0.0 {
            return Err(ConfigError::NegativeRate {
                name: "slippage",
                value: slippage_rate,
            });
        }
        if commission_rate < 0.0 {
            return Err(ConfigError::NegativeRate {
                name: "commission",
                value: commission_rate,
            });
        }
        Ok(Self {
            slippage_rate,
            commission_rate,
        })
    }

    pub fn frictionless() -> Self {
        Self {
            slippage_rate: 0.0,
            commission_rate: 0.0,
        }
    }

    pub fn slippage_rate(&self) -> f64 {
        self.slippage_rate
    }

    pub fn commission_rate(&self) -> f64 {
        self.commission_rate
    }

    /// Decide fill/no-fill for an order against the current bar.
    ///
    /// Assumes a validated order. `None` means the order did not execute on
    /// this bar and may be retried on the next one.
    pub fn fill(&self, order: &Order, bar: &Bar) -> Option<Fill> {
        let price = match order.kind {
            OrderKind::Market => Some(self.slipped_price(bar.close, order.side)),
            OrderKind::Limit { limit_price } => match order.side {
                // Buy limit executes when the bar traded at or below the limit.
                OrderSide::Buy if bar.low <= limit_price => Some(limit_price.min(bar.close)),
                // Sell limit executes when the bar traded at or above the limit.
                OrderSide::Sell if bar.high >= limit_price => Some(limit_price.max(bar.close)),
                _ => None,
            },
        }?;

        Some(Fill {
            order_id: order.id,
            position_key: order.resolved_key(),
            timestamp: bar.timestamp,
            side: order.side,
            price,
            quantity: order.quantity,
            commission: self.commission(price, order.quantity),
        })
    }

    /// Close price adjusted against the trader: buys pay more, sells receive less.
    pub fn slipped_price(&self, close: f64, side: OrderSide) -> f64 {
        match side {
            OrderSide::Buy => close * (1.0 + self.slippage_rate),
            OrderSide::Sell => close * (1.0 - self.slippage_rate),
        }
    }

    pub fn commission(&self, fill_price: f64, quantity: f64) -> f64 {
        fill_price * quantity * self.commission_rate
    }
}
