//! Run fingerprinting for replay verification.
//!
//! Two runs over identical bars, configuration and strategy decisions must
//! produce identical history. The fingerprint makes that checkable: a blake3
//! digest over the canonical JSON of the run's trades and snapshots.
//! `serde_json` serializes maps with sorted keys and floats in shortest
//! round-trip form, so the byte stream is stable across runs and platforms.

use crate::domain::{CompletedTrade, PortfolioSnapshot};

/// Hex digest of a run's recorded history.
pub fn run_fingerprint(trades: &[CompletedTrade], snapshots: &[PortfolioSnapshot]) -> String {
    let canonical = serde_json::json!({
        "trades": trades,
        "snapshots": snapshots,
    });
    blake3::hash(canonical.to_string().as_bytes())
        .to_hex()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PositionKey, PositionSide};
    use chrono::{TimeZone, Utc};

    fn sample_trade(exit_price: f64) -> CompletedTrade {
        CompletedTrade {
            position_key: PositionKey::default_key(),
            side: PositionSide::Long,
            entry_price: 100.0,
            exit_price,
            quantity: 10.0,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            exit_time: Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap(),
            realized_pnl: (exit_price - 100.0) * 10.0,
            commission: 1.1,
        }
    }

    #[test]
    fn identical_history_hashes_identically() {
        let trades = vec![sample_trade(110.0)];
        assert_eq!(
            run_fingerprint(&trades, &[]),
            run_fingerprint(&trades, &[])
        );
    }

    #[test]
    fn any_difference_changes_the_digest() {
        let a = vec![sample_trade(110.0)];
        let b = vec![sample_trade(110.00000001)];
        assert_ne!(run_fingerprint(&a, &[]), run_fingerprint(&b, &[]));
    }

    #[test]
    fn digest_is_hex_of_fixed_width() {
        let digest = run_fingerprint(&[], &[]);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
