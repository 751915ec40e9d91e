//! Platform fee arithmetic.
//!
//! Fees are integer basis points of the gross amount, floor-divided: the
//! platform's cut rounds down and the seller receives the remainder. The
//! rounding rule is an explicit contract — for `total = 700` at 250 bps,
//! `fee = 17` (700 × 250 / 10000 = 17.5, floored) and the seller gets 683.

use serde::{Deserialize, Serialize};

use carbonledger_types::constants::FEE_DENOMINATOR;

/// The outcome of splitting a gross amount into fee and seller proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Platform cut, floored.
    pub fee: u64,
    /// What the seller receives: `total - fee`.
    pub proceeds: u64,
}

/// Split `total` at `fee_bps` basis points.
///
/// The intermediate product is computed in `u128`, so the split is exact
/// for any `u64` total and any in-bounds fee rate.
#[must_use]
pub fn fee_split(total: u64, fee_bps: u64) -> FeeSplit {
    let fee = u128::from(total) * u128::from(fee_bps) / u128::from(FEE_DENOMINATOR);
    let fee = u64::try_from(fee).expect("fee is bounded by total");
    FeeSplit {
        fee,
        proceeds: total - fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_rounds_down_seller_gets_remainder() {
        // 700 × 250 / 10000 = 17.5 → 17
        let split = fee_split(700, 250);
        assert_eq!(split.fee, 17);
        assert_eq!(split.proceeds, 683);
        assert_eq!(split.fee + split.proceeds, 700);
    }

    #[test]
    fn zero_rate_means_zero_fee() {
        let split = fee_split(1_000_000, 0);
        assert_eq!(split.fee, 0);
        assert_eq!(split.proceeds, 1_000_000);
    }

    #[test]
    fn max_rate_takes_ten_percent() {
        let split = fee_split(1_000, 1_000);
        assert_eq!(split.fee, 100);
        assert_eq!(split.proceeds, 900);
    }

    #[test]
    fn split_is_exact_at_u64_extremes() {
        let split = fee_split(u64::MAX, 250);
        assert_eq!(split.fee + split.proceeds, u64::MAX);
        assert_eq!(split.fee, u64::try_from(u128::from(u64::MAX) * 250 / 10_000).unwrap());
    }

    #[test]
    fn small_totals_floor_to_zero_fee() {
        // 3 × 250 / 10000 = 0.075 → 0
        let split = fee_split(3, 250);
        assert_eq!(split.fee, 0);
        assert_eq!(split.proceeds, 3);
    }

    #[test]
    fn fee_split_serde_roundtrip() {
        let split = fee_split(700, 250);
        let json = serde_json::to_string(&split).unwrap();
        let back: FeeSplit = serde_json::from_str(&json).unwrap();
        assert_eq!(split, back);
    }
}
