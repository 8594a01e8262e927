//! Domain types: bars, orders, fills, trades, snapshots.

pub mod bar;
pub mod fill;
pub mod ids;
pub mod order;
pub mod position;
pub mod snapshot;
pub mod trade;

pub use bar::{validate_series, Bar};
pub use fill::Fill;
pub use ids::{OrderId, PositionKey};
pub use order::{Order, OrderKind, OrderSide};
pub use position::PositionSide;
pub use snapshot::PortfolioSnapshot;
pub use trade::CompletedTrade;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Boundary validation failures for orders and bars.
///
/// The engine's hot path assumes validated input; these are raised before an
/// order or bar series enters the core, never inside it.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("order quantity must be positive (got {0})")]
    NonPositiveQuantity(f64),

    #[error("limit price must be positive (got {0})")]
    NonPositiveLimitPrice(f64),

    #[error("bar at {0} fails OHLC consistency")]
    InconsistentBar(DateTime<Utc>),

    #[error("bar timestamps must be strictly increasing ({prev} then {next})")]
    NonMonotonicTimestamp {
        prev: DateTime<Utc>,
        next: DateTime<Utc>,
    },
}
