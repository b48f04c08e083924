//! # Money Module
//!
//! Fixed-point numeric types used by every calculation in Tally.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  Commission on $30,000.00 at 5% must be exactly $1,500.00, and the     │
//! │  sum of a month of sales must equal the volume shown on the dashboard. │
//! │                                                                         │
//! │  OUR SOLUTION: three integer newtypes                                   │
//! │    Money   i64 cents        $30,000.00  → 3_000_000                     │
//! │    Points  i64 hundredths   5500.00 pts → 550_000                       │
//! │    Rate    u32 basis points 3.5%        → 350                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Every "round to two decimals" in the business rules is half-up toward
//! positive infinity (`2.5 → 3`, `-2.5 → -2`). [`round_div`] is the single
//! place that implements it.
//!
//! ## Usage
//! ```rust
//! use tally_core::money::{Money, Rate};
//!
//! let sale = Money::from_dollars(30_000);
//! let commission = sale.apply_rate(Rate::from_percent(5));
//! assert_eq!(commission, Money::from_dollars(1_500));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Divides `num` by a positive `den`, rounding half up.
///
/// Equivalent to `floor(num / den + 0.5)` computed without floats.
///
/// ```rust
/// use tally_core::money::round_div;
///
/// assert_eq!(round_div(5, 2), 3);
/// assert_eq!(round_div(-5, 2), -2);
/// assert_eq!(round_div(10, 4), 3);
/// ```
pub fn round_div(num: i128, den: i128) -> i64 {
    debug_assert!(den > 0, "round_div requires a positive divisor");
    (2 * num + den).div_euclid(2 * den) as i64
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  SaleDetails.sale_amount ──┬──► commission_amount (× base rate)         │
/// │                            ├──► fdi_points_available (× 0.55)           │
/// │                            └──► daily_vpg (÷ tours)                     │
/// │                                                                         │
/// │  Σ active sale_amount ──► SalesTotals.total_volume ──► monthly_vpg      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole dollars.
    ///
    /// Tier bounds and thresholds are whole-dollar amounts, so most
    /// constants in the rules are built with this.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion (truncated toward zero).
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds, clamping at the `i64` bounds instead of wrapping.
    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Multiplies by a percentage rate, rounding to the nearest cent.
    ///
    /// ```rust
    /// use tally_core::money::{Money, Rate};
    ///
    /// // $1,234.57 × 5% = $61.7285 → $61.73
    /// let amount = Money::from_cents(123_457);
    /// assert_eq!(amount.apply_rate(Rate::from_percent(5)).cents(), 6_173);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        Money(round_div(self.0 as i128 * rate.bps() as i128, 10_000))
    }

    /// Divides evenly into `parts`, rounding to the nearest cent.
    ///
    /// Returns zero when `parts` is zero.
    pub fn div_round(&self, parts: u32) -> Money {
        if parts == 0 {
            return Money::zero();
        }
        Money(round_div(self.0 as i128, parts as i128))
    }

    /// Value as floating-point dollars, for spreadsheet cells only.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Formats with thousands separators, e.g. `$30,000.00`.
    pub fn to_grouped_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}${}.{:02}",
            sign,
            group_thousands(self.dollars().unsigned_abs()),
            self.cents_part()
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parses a decimal amount with at most two fractional digits.
///
/// Accepts an optional leading `$` and `,` thousands separators:
/// `30000`, `30,000.5`, `$1,250.00`.
fn parse_decimal(field: &str, input: &str) -> Result<i64, ValidationError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (whole, frac) = match body.split_once('.') {
        Some((w, f)) => (w, f),
        None => (body, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(ValidationError::invalid_format(field, "empty amount"));
    }
    if frac.len() > 2 {
        return Err(ValidationError::invalid_format(
            field,
            "at most two decimal places",
        ));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            field,
            format!("'{}' is not a number", input.trim()),
        ));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| ValidationError::invalid_format(field, "amount too large"))?
    };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().unwrap_or(0) * 10,
        _ => frac.parse::<i64>().unwrap_or(0),
    };

    let value = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(|| ValidationError::invalid_format(field, "amount too large"))?;
    Ok(if negative { -value } else { value })
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal("amount", s).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Points Type
// =============================================================================

/// FDI points in hundredths of a point.
///
/// `5500.00` points is stored as `550_000`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Points(i64);

impl Points {
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Points(hundredths)
    }

    #[inline]
    pub const fn from_whole(points: i64) -> Self {
        Points(points * 100)
    }

    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Points(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Points(self.0.saturating_add(other.0))
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl FromStr for Points {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal("points", s).map(Points)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Points {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Points(self.0 + other.0)
    }
}

impl AddAssign for Points {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Points {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Points(self.0 - other.0)
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Points::zero(), |acc, p| acc + p)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage in basis points (1 bp = 0.01%).
///
/// ## Examples
/// - 6%   → 600 bps
/// - 3.5% → 350 bps
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Rate(percent * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Percentage as a float (e.g., 350 bps → 3.5).
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl FromStr for Rate {
    type Err = ValidationError;

    /// Parses a percentage such as `3.5` or `3.5%`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bps = parse_decimal("rate", s.trim().trim_end_matches('%'))?;
        u32::try_from(bps)
            .map(Rate)
            .map_err(|_| ValidationError::MustNotBeNegative {
                field: "rate".to_string(),
            })
    }
}

/// Displays as a percentage without trailing zeros: `6%`, `3.5%`, `0.25%`.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

impl Add for Rate {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Rate(self.0 + other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
