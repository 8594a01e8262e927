//! Bar — the fundamental market data unit.

use super::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single instrument over one period.
///
/// Immutable once constructed. The engine assumes a pre-validated, strictly
/// time-ordered bar sequence; run [`validate_series`] at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// OHLCV sanity check: positive prices, high covers open/close, low under them.
    pub fn is_sane(&self) -> bool {
        self.open > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.close > 0.0
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume >= 0.0
            && self.volume.is_finite()
    }
}

/// Validate a bar series at the engine boundary.
///
/// Checks every bar's OHLC consistency and that timestamps strictly increase.
pub fn validate_series(bars: &[Bar]) -> Result<(), ValidationError> {
    for bar in bars {
        if !bar.is_sane() {
            return Err(ValidationError::InconsistentBar(bar.timestamp));
        }
    }
    for pair in bars.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(ValidationError::NonMonotonicTimestamp {
                prev: pair[0].timestamp,
                next: pair[1].timestamp,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, minute, 0).unwrap()
    }

    fn sample_bar() -> Bar {
        Bar::new(ts(30), 100.0, 105.0, 98.0, 103.0, 50_000.0)
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());

        let mut bar = sample_bar();
        bar.low = 104.0; // above open
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_non_positive_prices() {
        let mut bar = sample_bar();
        bar.close = 0.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn series_rejects_non_monotonic_timestamps() {
        let a = sample_bar();
        let mut b = sample_bar();
        b.timestamp = ts(31);
        assert!(validate_series(&[a.clone(), b.clone()]).is_ok());

        // Equal timestamps are not allowed either.
        let result = validate_series(&[b.clone(), b]);
        assert!(matches!(
            result,
            Err(ValidationError::NonMonotonicTimestamp { .. })
        ));
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
