//! Bar-replay driver.
//!
//! The engine owns a portfolio and replays a validated bar series through a
//! strategy callback. Per bar: pending limit orders are retried first, the
//! strategy sees a read-only view and emits orders, orders are submitted,
//! and the bar's snapshot is recorded. Strategy logic itself stays outside
//! the crate; the callback is the seam.

use crate::config::{ConfigError, SimConfig};
use crate::domain::{
    validate_series, Bar, CompletedTrade, Fill, Order, PortfolioSnapshot, ValidationError,
};
use crate::fingerprint::run_fingerprint;
use crate::portfolio::{ExecutionStats, PortfolioAggregator, PortfolioView};
use serde::{Deserialize, Serialize};

/// Everything one replay produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub snapshots: Vec<PortfolioSnapshot>,
    pub trades: Vec<CompletedTrade>,
    pub fills: Vec<Fill>,
    pub stats: ExecutionStats,
    pub initial_value: f64,
    pub final_value: f64,
    /// blake3 digest of the run's history; equal digests mean equal runs.
    pub fingerprint: String,
}

impl RunResult {
    pub fn total_return_pct(&self) -> f64 {
        (self.final_value - self.initial_value) / self.initial_value * 100.0
    }

    pub fn winning_trades(&self) -> usize {
        self.trades.iter().filter(|t| t.is_winner()).count()
    }
}

/// Replays bar series against strategy callbacks.
pub struct Engine {
    portfolio: PortfolioAggregator,
}

impl Engine {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            portfolio: PortfolioAggregator::new(config)?,
        })
    }

    pub fn portfolio(&self) -> &PortfolioAggregator {
        &self.portfolio
    }

    /// Replay `bars` through `strategy`, returning the full run history.
    ///
    /// The portfolio is reset first, so repeated calls on one engine are
    /// independent runs; identical inputs yield identical fingerprints. An
    /// empty series is a valid no-op run ending at initial capital. Bars
    /// must be OHLC-consistent with strictly increasing timestamps.
    pub fn run<F>(&mut self, bars: &[Bar], mut strategy: F) -> Result<RunResult, ValidationError>
    where
        F: FnMut(&Bar, &PortfolioView) -> Vec<Order>,
    {
        validate_series(bars)?;
        self.portfolio.reset();
        let initial_value = self.portfolio.config().initial_capital;

        for bar in bars {
            self.portfolio.poll_pending(bar);
            let view = self.portfolio.view(bar);
            for order in strategy(bar, &view) {
                self.portfolio.submit(order, bar)?;
            }
            self.portfolio.record_snapshot(bar);
        }

        let final_value = self
            .portfolio
            .snapshots()
            .last()
            .map(|snapshot| snapshot.total_value)
            .unwrap_or(initial_value);
        let fingerprint = run_fingerprint(self.portfolio.trades(), self.portfolio.snapshots());

        Ok(RunResult {
            snapshots: self.portfolio.snapshots().to_vec(),
            trades: self.portfolio.trades().to_vec(),
            fills: self.portfolio.fills().to_vec(),
            stats: self.portfolio.stats(),
            initial_value,
            final_value,
            fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderId, OrderSide};
    use chrono::{TimeZone, Utc};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                Bar::new(
                    Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap(),
                    close,
                    close * 1.01,
                    close * 0.99,
                    close,
                    10_000.0,
                )
            })
            .collect()
    }

    fn frictionless_config() -> SimConfig {
        SimConfig {
            slippage_rate: 0.0,
            commission_rate: 0.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn empty_series_is_a_valid_noop_run() {
        let mut engine = Engine::new(frictionless_config()).unwrap();
        let result = engine.run(&[], |_, _| Vec::new()).unwrap();
        assert!(result.snapshots.is_empty());
        assert_eq!(result.final_value, 100_000.0);
        assert_eq!(result.total_return_pct(), 0.0);
    }

    #[test]
    fn one_snapshot_per_bar() {
        let mut engine = Engine::new(frictionless_config()).unwrap();
        let series = bars(&[100.0, 101.0, 99.0]);
        let result = engine.run(&series, |_, _| Vec::new()).unwrap();
        assert_eq!(result.snapshots.len(), 3);
        assert!(result.trades.is_empty());
    }

    #[test]
    fn buy_first_bar_sell_last_bar() {
        let mut engine = Engine::new(frictionless_config()).unwrap();
        let series = bars(&[100.0, 105.0, 110.0]);
        let result = engine
            .run(&series, |bar, view| {
                if view.is_flat() && bar.close == 100.0 {
                    vec![Order::market(OrderId(1), OrderSide::Buy, 10.0)]
                } else if bar.close == 110.0 {
                    vec![Order::market(OrderId(2), OrderSide::Sell, 10.0)]
                } else {
                    Vec::new()
                }
            })
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        assert!((result.trades[0].realized_pnl - 100.0).abs() < 1e-10);
        assert!((result.final_value - 100_100.0).abs() < 1e-10);
        assert_eq!(result.winning_trades(), 1);
    }

    #[test]
    fn runs_are_replayable() {
        let mut engine = Engine::new(SimConfig::default()).unwrap();
        let series = bars(&[100.0, 104.0, 97.0, 103.0, 108.0]);
        let strategy = |bar: &Bar, view: &PortfolioView| {
            if view.is_flat() && bar.close < 100.0 {
                vec![Order::market(OrderId(1), OrderSide::Buy, 50.0)]
            } else if !view.is_flat() && bar.close > 105.0 {
                vec![Order::market(OrderId(2), OrderSide::Sell, 50.0)]
            } else {
                Vec::new()
            }
        };

        let first = engine.run(&series, strategy).unwrap();
        let second = engine.run(&series, strategy).unwrap();
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(first.snapshots, second.snapshots);
    }

    #[test]
    fn unsorted_bars_rejected() {
        let mut engine = Engine::new(frictionless_config()).unwrap();
        let mut series = bars(&[100.0, 101.0]);
        series.swap(0, 1);
        let result = engine.run(&series, |_, _| Vec::new());
        assert!(matches!(
            result,
            Err(ValidationError::NonMonotonicTimestamp { .. })
        ));
    }
}
