//! # FDI Rules
//!
//! FDI points are the bonus points a sale entitles the client to. Granting
//! more than that costs the house 4.8 cents per excess point.
//!
//! ```text
//!   sale amount ──► × 0.55 ──► points available
//!                                      │
//!   points given ──────────────────────┴──► excess × $0.048 ──► FDI cost
//! ```

use crate::money::{round_div, Money, Points};

/// Points earned per dollar of sale, in hundredths (0.55).
const POINTS_PER_DOLLAR_HUNDREDTHS: i128 = 55;

/// Cost per excess point in tenths of a cent (4.8¢).
const COST_PER_POINT_MILLS: i128 = 48;

/// Points a sale earns: `amount × 0.55`, to two decimals.
///
/// ```rust
/// use tally_core::fdi::fdi_points_available;
/// use tally_core::money::{Money, Points};
///
/// assert_eq!(fdi_points_available(Money::from_dollars(10_000)), Points::from_whole(5_500));
/// ```
pub fn fdi_points_available(amount: Money) -> Points {
    // cents × 0.55 is already hundredths of a point
    Points::from_hundredths(round_div(
        amount.cents() as i128 * POINTS_PER_DOLLAR_HUNDREDTHS,
        100,
    ))
}

/// Cost of points granted beyond what the sale earns.
///
/// Zero when `given <= available`.
pub fn fdi_cost(given: Points, available: Points) -> Money {
    if given <= available {
        return Money::zero();
    }
    let excess = (given - available).hundredths() as i128;
    // hundredths of a point × 4.8¢ = excess × 48 / 1000 cents
    Money::from_cents(round_div(excess * COST_PER_POINT_MILLS, 1_000))
}
