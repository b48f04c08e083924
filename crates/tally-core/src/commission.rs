//! # Commission Rules
//!
//! Base and tiered additional commission.
//!
//! ## How a Rate is Built
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sale amount + sale type ──► base_commission ─────────┐                 │
//! │                                                       ├──► total rate   │
//! │  cumulative volume + tiers ──► additional_commission ─┘    (stored)     │
//! │                                                                         │
//! │  sale amount × base rate ──► commission_amount (stored, paid)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Sale type | Amount        | Base |
//! |-----------|---------------|------|
//! | TRUST     | any           | 6%   |
//! | DEED      | ≥ $50,000     | 6%   |
//! | DEED      | ≥ $20,000     | 5%   |
//! | DEED      | below $20,000 | 4%   |
//!
//! The tier rate is recorded in the stored percentage but does not enter
//! the stored commission amount.

use crate::money::{Money, Rate};
use crate::types::{CommissionLevel, SaleType};

const TOP_BASE_RATE: Rate = Rate::from_percent(6);
const MID_BASE_RATE: Rate = Rate::from_percent(5);
const LOW_BASE_RATE: Rate = Rate::from_percent(4);

const TOP_BASE_THRESHOLD: Money = Money::from_dollars(50_000);
const MID_BASE_THRESHOLD: Money = Money::from_dollars(20_000);

/// Base commission rate for a single sale.
pub fn base_commission(amount: Money, sale_type: SaleType) -> Rate {
    match sale_type {
        SaleType::Trust => TOP_BASE_RATE,
        SaleType::Deed if amount >= TOP_BASE_THRESHOLD => TOP_BASE_RATE,
        SaleType::Deed if amount >= MID_BASE_THRESHOLD => MID_BASE_RATE,
        SaleType::Deed => LOW_BASE_RATE,
    }
}

/// Tier whose inclusive band contains `volume`, if any.
///
/// The first matching tier wins. Volumes that fall between two bands
/// match nothing.
pub fn current_level(volume: Money, levels: &[CommissionLevel]) -> Option<&CommissionLevel> {
    levels.iter().find(|level| level.contains(volume))
}

/// Additional rate earned at a cumulative volume. Zero outside every tier.
pub fn additional_commission(volume: Money, levels: &[CommissionLevel]) -> Rate {
    current_level(volume, levels)
        .map(|level| level.additional_rate)
        .unwrap_or_else(Rate::zero)
}

/// Base plus additional rate, as stored on the sale.
pub fn total_commission_rate(
    amount: Money,
    volume: Money,
    sale_type: SaleType,
    levels: &[CommissionLevel],
) -> Rate {
    base_commission(amount, sale_type) + additional_commission(volume, levels)
}

/// Commission paid on a sale: `amount × base rate`, rounded to the cent.
pub fn commission_amount(amount: Money, sale_type: SaleType) -> Money {
    amount.apply_rate(base_commission(amount, sale_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_commission_levels;

    fn dollars(d: i64) -> Money {
        Money::from_dollars(d)
    }

    #[test]
    fn test_base_commission_deed_thresholds() {
        assert_eq!(base_commission(dollars(49_999), SaleType::Deed), Rate::from_percent(5));
        assert_eq!(base_commission(dollars(50_000), SaleType::Deed), Rate::from_percent(6));
        assert_eq!(base_commission(dollars(20_000), SaleType::Deed), Rate::from_percent(5));
        assert_eq!(
            base_commission(Money::from_cents(1_999_999), SaleType::Deed),
            Rate::from_percent(4)
        );
        assert_eq!(base_commission(dollars(0), SaleType::Deed), Rate::from_percent(4));
    }

    #[test]
    fn test_base_commission_trust_is_flat() {
        for amount in [0, 1_000, 19_999, 50_000, 250_000] {
            assert_eq!(base_commission(dollars(amount), SaleType::Trust), Rate::from_percent(6));
        }
    }

    #[test]
    fn test_additional_commission_bounds() {
        let levels = default_commission_levels();
        assert_eq!(additional_commission(dollars(162_500), &levels), Rate::from_percent(1));
        assert_eq!(additional_commission(dollars(161_999), &levels), Rate::zero());
        assert_eq!(additional_commission(dollars(243_749), &levels), Rate::from_percent(1));
        assert_eq!(additional_commission(dollars(243_750), &levels), Rate::from_percent(2));
        assert_eq!(additional_commission(dollars(406_250), &levels), Rate::from_bps(350));
        assert_eq!(additional_commission(dollars(999_999_999), &levels), Rate::from_percent(6));
    }

    #[test]
    fn test_volume_between_bands_matches_nothing() {
        let levels = default_commission_levels();
        // $243,749.50 sits between level 1 and level 2
        let gap = Money::from_cents(24_374_950);
        assert_eq!(additional_commission(gap, &levels), Rate::zero());
        assert!(current_level(gap, &levels).is_none());
    }

    #[test]
    fn test_current_level() {
        let levels = default_commission_levels();
        let level = current_level(dollars(600_000), &levels).map(|l| l.level);
        assert_eq!(level, Some(6));
        assert!(current_level(dollars(1_000_000_000), &levels).is_none());
    }

    #[test]
    fn test_total_rate_and_amount() {
        let levels = default_commission_levels();
        let rate = total_commission_rate(dollars(30_000), dollars(250_000), SaleType::Deed, &levels);
        assert_eq!(rate, Rate::from_percent(7));

        // Tier rate does not enter the paid amount.
        assert_eq!(commission_amount(dollars(30_000), SaleType::Deed), dollars(1_500));
        assert_eq!(commission_amount(dollars(60_000), SaleType::Trust), dollars(3_600));
        assert_eq!(
            commission_amount(Money::from_cents(1_234_567), SaleType::Deed),
            Money::from_cents(49_383)
        );
    }

    #[test]
    fn test_empty_tier_table() {
        assert_eq!(additional_commission(dollars(500_000), &[]), Rate::zero());
    }
}
