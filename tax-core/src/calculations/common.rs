//! Shared arithmetic for the estimator and the allocation mapper.
//!
//! Calculations never round while accumulating. Rounding to cents happens
//! only when a value leaves the core for display or storage.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * percent / 100`, where `percent` is a whole-number percentage.
/// `None` when the product does not fit in a `Decimal`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(2145), dec!(29)), Some(dec!(622.05)));
/// ```
pub fn percent_of(
    amount: Decimal,
    percent: Decimal,
) -> Option<Decimal> {
    amount
        .checked_mul(percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}

/// `part / whole * scale`, or zero when `whole` is not positive.
///
/// Multiplies before dividing so that exact quotients stay exact, which
/// means a large `part` can overflow; that gives `None`.
pub fn proportional_share(
    part: Decimal,
    whole: Decimal,
    scale: Decimal,
) -> Option<Decimal> {
    if whole <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    part.checked_mul(scale)?.checked_div(whole)
}
