//! Run configuration: TOML-loadable, validated eagerly at construction.

use crate::sizing::LotConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration rejected at construction time.
///
/// Fatal to the configuration object only; nothing downstream sees an
/// invalid config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base lot size must be positive (got {0})")]
    NonPositiveBaseLot(f64),

    #[error("minimum lot size must be positive (got {0})")]
    NonPositiveMinLot(f64),

    #[error("lot step must be positive (got {0})")]
    NonPositiveLotStep(f64),

    #[error("lot step {step} exceeds minimum lot size {min_lot}")]
    StepExceedsMinLot { step: f64, min_lot: f64 },

    #[error("max lot cap must be positive (got {0})")]
    NonPositiveMaxLotCap(f64),

    #[error("capital fraction must be in (0, 1] (got {0})")]
    InvalidCapitalFraction(f64),

    #[error("{name} rate must be non-negative (got {value})")]
    NegativeRate { name: &'static str, value: f64 },

    #[error("initial capital must be positive (got {0})")]
    NonPositiveCapital(f64),

    #[error("max positions must be at least 1")]
    ZeroMaxPositions,

    #[error("max position fraction must be in (0, 1] (got {0})")]
    InvalidPositionFraction(f64),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration for a single simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub initial_capital: f64,
    /// Execution-price penalty against the trader, as a fraction (0.001 = 0.1%).
    pub slippage_rate: f64,
    /// Commission as a fraction of fill notional per side.
    pub commission_rate: f64,
    /// Maximum number of concurrently open position ledgers.
    pub max_positions: usize,
    /// Cap on a single order's notional as a fraction of total portfolio value.
    pub max_position_fraction: f64,
    /// Whether a sell exceeding held long exposure may flip into a short.
    pub allow_shorting: bool,
    pub lot: LotConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            slippage_rate: 0.001,
            commission_rate: 0.001,
            max_positions: 5,
            max_position_fraction: 1.0,
            allow_shorting: false,
            lot: LotConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if self.slippage_rate < 0.0 {
            return Err(ConfigError::NegativeRate {
                name: "slippage",
                value: self.slippage_rate,
            });
        }
        if self.commission_rate < 0.0 {
            return Err(ConfigError::NegativeRate {
                name: "commission",
                value: self.commission_rate,
            });
        }
        if self.max_positions == 0 {
            return Err(ConfigError::ZeroMaxPositions);
        }
        if self.max_position_fraction <= 0.0 || self.max_position_fraction > 1.0 {
            return Err(ConfigError::InvalidPositionFraction(
                self.max_position_fraction,
            ));
        }
        self.lot.validate()
    }

    /// Parse and validate a TOML run configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::LotSizeMode;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_rates_rejected() {
        let mut config = SimConfig {
            slippage_rate: -0.001,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeRate { name: "slippage", .. })
        ));

        config.slippage_rate = 0.0;
        config.commission_rate = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_capital_rejected() {
        let config = SimConfig {
            initial_capital: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveCapital(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let config = SimConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = SimConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.initial_capital, config.initial_capital);
        assert_eq!(parsed.lot.min_lot, config.lot.min_lot);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let parsed = SimConfig::from_toml_str(
            r#"
            initial_capital = 50000.0
            allow_shorting = true

            [lot]
            mode = "fixed"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.initial_capital, 50_000.0);
        assert!(parsed.allow_shorting);
        assert_eq!(parsed.lot.mode, LotSizeMode::Fixed);
        assert_eq!(parsed.slippage_rate, 0.001); // default carried through
    }

    #[test]
    fn invalid_lot_section_rejected_eagerly() {
        let result = SimConfig::from_toml_str(
            r#"
            [lot]
            lot_step = 0.5
            min_lot = 0.01
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::StepExceedsMinLot { .. })
        ));
    }
}
