//! Volume per guest: sale volume divided by tours, to the cent.

use crate::money::Money;

/// VPG of a single entry. Zero when no tours were logged.
pub fn daily_vpg(amount: Money, tours: u32) -> Money {
    amount.div_round(tours)
}

/// VPG over a period's totals. Zero when no tours were logged.
pub fn monthly_vpg(volume: Money, tours: u32) -> Money {
    volume.div_round(tours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tours() {
        assert_eq!(daily_vpg(Money::from_dollars(10_000), 0), Money::zero());
        assert_eq!(monthly_vpg(Money::from_dollars(10_000), 0), Money::zero());
    }

    #[test]
    fn test_even_split() {
        assert_eq!(daily_vpg(Money::from_dollars(10_000), 4), Money::from_dollars(2_500));
        assert_eq!(monthly_vpg(Money::from_dollars(30_000), 3), Money::from_dollars(10_000));
    }

    #[test]
    fn test_rounds_to_cent() {
        // 10,000 / 3 = 3,333.333… → 3,333.33
        assert_eq!(daily_vpg(Money::from_dollars(10_000), 3), Money::from_cents(333_333));
        // 0.05 / 2 = 0.025 → 0.03
        assert_eq!(daily_vpg(Money::from_cents(5), 2), Money::from_cents(3));
    }
}
