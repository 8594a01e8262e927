//! Lot sizing — convert fractional lot counts into affordable asset quantities.
//!
//! Sizing is pure math: "how many lots can be afforded" lives here, "should a
//! trade happen" stays with strategy code. Both constant-stake (Fixed) and
//! rebalancing-style (Variable) sizing are supported. The policy never
//! returns a lot count whose cost exceeds available cash.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Asset class selector for the units-per-lot multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// 1 lot = 100 shares.
    Stock,
    /// 1 lot = 1 unit.
    Crypto,
    /// 1 lot = 100,000 units.
    Forex,
}

impl AssetClass {
    pub fn units_per_lot(self) -> f64 {
        match self {
            Self::Stock => 100.0,
            Self::Crypto => 1.0,
            Self::Forex => 100_000.0,
        }
    }
}

/// Lot size calculation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotSizeMode {
    /// Attempt a target lot count; clamp to what cash affords.
    Fixed,
    /// Size from a capital fraction of reference equity; clamp to the cap.
    Variable,
}

/// Configuration for lot-based position sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LotConfig {
    pub base_lot_size: f64,
    pub min_lot: f64,
    pub lot_step: f64,
    pub asset_class: AssetClass,
    pub mode: LotSizeMode,
    /// Fraction of reference equity allocated per trade (Variable mode).
    pub capital_fraction: f64,
    /// Upper bound on computed lots (Variable mode).
    pub max_lot_cap: f64,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            base_lot_size: 1.0,
            min_lot: 0.01,
            lot_step: 0.01,
            asset_class: AssetClass::Crypto,
            mode: LotSizeMode::Variable,
            capital_fraction: 0.1,
            max_lot_cap: 10.0,
        }
    }
}

impl LotConfig {
    pub fn new(
        base_lot_size: f64,
        min_lot: f64,
        lot_step: f64,
        asset_class: AssetClass,
        mode: LotSizeMode,
        capital_fraction: f64,
        max_lot_cap: f64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            base_lot_size,
            min_lot,
            lot_step,
            asset_class,
            mode,
            capital_fraction,
            max_lot_cap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_lot_size <= 0.0 {
            return Err(ConfigError::NonPositiveBaseLot(self.base_lot_size));
        }
        if self.min_lot <= 0.0 {
            return Err(ConfigError::NonPositiveMinLot(self.min_lot));
        }
        if self.lot_step <= 0.0 {
            return Err(ConfigError::NonPositiveLotStep(self.lot_step));
        }
        if self.lot_step > self.min_lot {
            return Err(ConfigError::StepExceedsMinLot {
                step: self.lot_step,
                min_lot: self.min_lot,
            });
        }
        if self.max_lot_cap <= 0.0 {
            return Err(ConfigError::NonPositiveMaxLotCap(self.max_lot_cap));
        }
        if self.capital_fraction <= 0.0 || self.capital_fraction > 1.0 {
            return Err(ConfigError::InvalidCapitalFraction(self.capital_fraction));
        }
        Ok(())
    }

    /// Convert a lot count into asset units.
    pub fn lot_to_units(&self, lots: f64) -> f64 {
        lots * self.base_lot_size * self.asset_class.units_per_lot()
    }

    /// Convert asset units into a lot count.
    pub fn units_to_lots(&self, units: f64) -> f64 {
        units / (self.base_lot_size * self.asset_class.units_per_lot())
    }

    /// Round to the nearest multiple of `lot_step` at or above `min_lot`.
    ///
    /// Returns 0.0 when the input rounds below the minimum — "no trade", not
    /// an error.
    pub fn round_lot(&self, lots: f64) -> f64 {
        if !lots.is_finite() || lots <= 0.0 {
            return 0.0;
        }
        let steps = ((lots - self.min_lot) / self.lot_step).round();
        let candidate = self.min_lot + steps * self.lot_step;
        let rounded = round_to_step_precision(candidate, self.lot_step);
        if rounded < self.min_lot {
            0.0
        } else {
            rounded
        }
    }

    /// Compute the lot count for a sizing request.
    ///
    /// Fixed mode attempts `target_lots` (default 1.0) and clamps to what
    /// cash affords. Variable mode allocates `capital_fraction` of the
    /// reference equity (`total_portfolio_value` if supplied, else
    /// `available_cash`), never more than available cash, clamped to
    /// `max_lot_cap`. The result is rounded, then stepped down until its
    /// cost fits within `available_cash`; 0.0 means no trade.
    pub fn compute_lot_size(
        &self,
        available_cash: f64,
        current_price: f64,
        target_lots: Option<f64>,
        total_portfolio_value: Option<f64>,
    ) -> f64 {
        if current_price <= 0.0 || available_cash <= 0.0 {
            return 0.0;
        }

        let raw_lots = match self.mode {
            LotSizeMode::Fixed => {
                let target = target_lots.unwrap_or(1.0);
                if self.lot_to_units(target) * current_price <= available_cash {
                    target
                } else {
                    self.units_to_lots(available_cash / current_price)
                }
            }
            LotSizeMode::Variable => {
                let reference_equity = total_portfolio_value.unwrap_or(available_cash);
                let trade_capital = (reference_equity * self.capital_fraction).min(available_cash);
                self.units_to_lots(trade_capital / current_price)
                    .min(self.max_lot_cap)
            }
        };

        let mut lots = self.round_lot(raw_lots);
        // Nearest-rounding may land one step beyond what cash affords.
        while lots >= self.min_lot && self.lot_to_units(lots) * current_price > available_cash {
            lots = round_to_step_precision(lots - self.lot_step, self.lot_step);
        }
        if lots < self.min_lot {
            0.0
        } else {
            lots
        }
    }
}

/// Round to the decimal precision of the step, avoiding float drift in
/// repeated step arithmetic (0.37 instead of 0.37000000000000005).
fn round_to_step_precision(value: f64, step: f64) -> f64 {
    let mut scale = 1.0_f64;
    let mut s = step;
    // Count decimal places of the step, capped to avoid pathological inputs.
    for _ in 0..12 {
        if (s - s.round()).abs() < 1e-9 {
            break;
        }
        s *= 10.0;
        scale *= 10.0;
    }
    (value * scale).round() / scale
}
