// ⚖️ Legal Rounding
// ROUND_HALF_UP over an exact decimal, never over the binary float.
//
// 2.5 → 3 and -2.5 → -3 (half away from zero).

use crate::error::{ensure_finite, FormatError, FormatResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Decimal places used for money everywhere in the court tools
pub const LEGAL_PLACES: u32 = 2;

/// Round an exact decimal half away from zero
pub fn round_legal_decimal(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a float with legal semantics, reporting values that cannot be
/// represented as a decimal (NaN, infinities, magnitudes beyond ~7.9e28).
pub fn try_round_legal(value: f64, places: u32) -> FormatResult<f64> {
    let exact = decimal_from_f64(ensure_finite(value)?)?;

    round_legal_decimal(exact, places)
        .to_f64()
        .ok_or_else(|| FormatError::Decimal(value.to_string()))
}

/// Fail-soft variant: a value that cannot be rounded is returned unchanged.
///
/// # Examples:
/// ```
/// use tribunal_admin::round_legal;
///
/// assert_eq!(round_legal(1.235, 2), 1.24);
/// assert_eq!(round_legal(2.5, 0), 3.0);
/// assert_eq!(round_legal(-2.5, 0), -3.0);
/// ```
pub fn round_legal(value: f64, places: u32) -> f64 {
    try_round_legal(value, places).unwrap_or(value)
}

/// Shortest round-trip text of the float, parsed as a decimal.
/// `1.235_f64` is stored as 1.23499999…, but its text is "1.235".
pub(crate) fn decimal_from_f64(value: f64) -> FormatResult<Decimal> {
    let text = value.to_string();
    Decimal::from_str(&text).map_err(|_| FormatError::Decimal(text))
}
