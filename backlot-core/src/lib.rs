//! Backlot Core — order execution simulation and portfolio accounting over
//! historical bars.
//!
//! This crate contains the money half of a backtester:
//! - Domain types (bars, orders, fills, trades, snapshots)
//! - Lot sizing with asset-class multipliers and affordability clamping
//! - Deterministic bar-by-bar execution simulation (market and limit fills,
//!   slippage, commission)
//! - Position ledgers with signed quantity and weighted-average cost basis
//! - Portfolio aggregation with feasibility gating, per-bar snapshots and a
//!   replay fingerprint
//!
//! Signal generation, analytics and data ingestion live outside this crate;
//! the strategy callback on [`engine::Engine::run`] is the seam.

pub mod config;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod fingerprint;
pub mod ledger;
pub mod portfolio;
pub mod sizing;

pub use config::{ConfigError, SimConfig};
pub use domain::{
    validate_series, Bar, CompletedTrade, Fill, Order, OrderId, OrderKind, OrderSide,
    PortfolioSnapshot, PositionKey, PositionSide, ValidationError,
};
pub use engine::{Engine, RunResult};
pub use execution::ExecutionSimulator;
pub use fingerprint::run_fingerprint;
pub use ledger::PositionLedger;
pub use portfolio::{ExecutionStats, PortfolioAggregator, PortfolioView};
pub use sizing::{AssetClass, LotConfig, LotSizeMode};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: run artifacts can cross thread boundaries, so a
    /// parallel parameter sweep can fan results in from worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<Order>();
        require_sync::<Order>();
        require_send::<Fill>();
        require_sync::<Fill>();
        require_send::<CompletedTrade>();
        require_sync::<CompletedTrade>();
        require_send::<PortfolioSnapshot>();
        require_sync::<PortfolioSnapshot>();
        require_send::<PositionLedger>();
        require_sync::<PositionLedger>();
        require_send::<PortfolioAggregator>();
        require_sync::<PortfolioAggregator>();
        require_send::<RunResult>();
        require_sync::<RunResult>();
        require_send::<SimConfig>();
        require_sync::<SimConfig>();
    }
}
