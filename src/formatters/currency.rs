// 💲 Currency / Percentage formatting + the inverse monetary cleaner
// Argentine convention: "." groups thousands, "," separates decimals.

use crate::error::{ensure_finite, FormatError, FormatResult};
use rust_decimal::{Decimal, RoundingStrategy};

pub const ZERO_CURRENCY: &str = "$ 0,00";
pub const ZERO_PERCENTAGE: &str = "0,00%";

/// Temporary stand-in while "," and "." trade places
const SEPARATOR_PLACEHOLDER: char = '\u{1F}';

// ============================================================================
// INPUT
// ============================================================================

/// A value handed to the display formatters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Missing,
    Float(f64),
    Exact(Decimal),
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Float(value)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::Exact(Decimal::from(value))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Exact(Decimal::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount::Exact(Decimal::from(value))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Exact(value)
    }
}

// Only one Option impl, so a bare `None` still infers
impl From<Option<f64>> for Amount {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Amount::Missing, Amount::Float)
    }
}

// ============================================================================
// CURRENCY
// ============================================================================

/// Render a finite value as `$ 1.234.567,89`
pub fn try_format_currency(value: f64) -> FormatResult<String> {
    let value = ensure_finite(value)?;
    let grouped = group_thousands(&format!("{:.2}", value));

    Ok(format!("$ {}", swap_separators(&grouped)))
}

/// Exact variant, cents rounded half-to-even like the float path
pub fn format_currency_decimal(value: Decimal) -> String {
    let cents = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let grouped = group_thousands(&format!("{:.2}", cents));

    format!("$ {}", swap_separators(&grouped))
}

/// Display-side currency formatter. Missing or non-finite values render as
/// `$ 0,00` instead of failing.
///
/// # Examples:
/// ```
/// use tribunal_admin::format_currency;
///
/// assert_eq!(format_currency(1234567.89), "$ 1.234.567,89");
/// assert_eq!(format_currency(0), "$ 0,00");
/// assert_eq!(format_currency(None), "$ 0,00");
/// ```
pub fn format_currency(value: impl Into<Amount>) -> String {
    let formatted = match value.into() {
        Amount::Missing => None,
        Amount::Float(v) => try_format_currency(v).ok(),
        Amount::Exact(d) => Some(format_currency_decimal(d)),
    };

    formatted.unwrap_or_else(|| ZERO_CURRENCY.to_string())
}

/// "1234567.89" → "1,234,567.89" (sign kept in front)
fn group_thousands(plain: &str) -> String {
    let (sign, digits) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(plain.len() + int_part.len() / 3);
    grouped.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }

    grouped
}

fn swap_separators(us_style: &str) -> String {
    us_style
        .replace(',', &SEPARATOR_PLACEHOLDER.to_string())
        .replace('.', ",")
        .replace(SEPARATOR_PLACEHOLDER, ".")
}

// ============================================================================
// PERCENTAGE
// ============================================================================

/// `value` is a fraction: 0.15 → "15,00%" with `decimals = 2`
pub fn try_format_percentage(value: f64, decimals: usize) -> FormatResult<String> {
    let percentage = ensure_finite(value)? * 100.0;
    Ok(format!("{:.*}%", decimals, percentage).replace('.', ","))
}

fn percentage_from_decimal(value: Decimal, decimals: usize) -> Option<String> {
    let percentage = value
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(u32::try_from(decimals).ok()?, RoundingStrategy::MidpointNearestEven);

    Some(format!("{:.*}%", decimals, percentage).replace('.', ","))
}

/// Two-decimal percentage, `0,00%` on missing/invalid input
pub fn format_percentage(value: impl Into<Amount>) -> String {
    format_percentage_with(value, 2)
}

pub fn format_percentage_with(value: impl Into<Amount>, decimals: usize) -> String {
    let formatted = match value.into() {
        Amount::Missing => None,
        Amount::Float(v) => try_format_percentage(v, decimals).ok(),
        Amount::Exact(d) => percentage_from_decimal(d, decimals),
    };

    formatted.unwrap_or_else(|| ZERO_PERCENTAGE.to_string())
}

// ============================================================================
// MONETARY CLEANER
// ============================================================================

/// Parse "$ 1.234,56", "$1234.56", "1234,56" back into a number.
///
/// When both separators appear the Argentine convention wins; a lone comma
/// is the decimal separator; a lone dot (or none) is parsed as-is.
pub fn try_parse_monetary_string(text: &str) -> FormatResult<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '$' && !c.is_whitespace())
        .collect();

    let normalized = if cleaned.contains(',') && cleaned.contains('.') {
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.contains(',') {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FormatError::InvalidAmount(text.to_string())),
    }
}

/// Fail-soft cleaner: unparseable text becomes 0.0, so callers cannot tell
/// "$ 0,00" apart from garbage. Use [`try_parse_monetary_string`] when that matters.
pub fn parse_monetary_string(text: &str) -> f64 {
    try_parse_monetary_string(text).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_examples() {
        assert_eq!(format_currency(1234567.89), "$ 1.234.567,89");
        assert_eq!(format_currency(0.0), "$ 0,00");
        assert_eq!(format_currency(None), "$ 0,00");
    }

    #[test]
    fn test_format_currency_grouping() {
        assert_eq!(format_currency(999.5), "$ 999,50");
        assert_eq!(format_currency(1000.0), "$ 1.000,00");
        assert_eq!(format_currency(123456.0), "$ 123.456,00");
        assert_eq!(format_currency(1_000_000_000.0), "$ 1.000.000.000,00");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(-1234.5), "$ -1.234,50");
        assert_eq!(format_currency(-12.0), "$ -12,00");
    }

    #[test]
    fn test_format_currency_non_finite_falls_back() {
        assert_eq!(format_currency(f64::NAN), ZERO_CURRENCY);
        assert_eq!(format_currency(f64::INFINITY), ZERO_CURRENCY);
        assert!(try_format_currency(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_format_currency_option() {
        let missing: Option<f64> = None;
        assert_eq!(format_currency(missing), "$ 0,00");
        assert_eq!(format_currency(Some(45.99)), "$ 45,99");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.15), "15,00%");
        assert_eq!(format_percentage_with(0.1567, 3), "15,670%");
        assert_eq!(format_percentage_with(0.5, 0), "50%");
        assert_eq!(format_percentage(None), "0,00%");
        assert_eq!(format_percentage(f64::NAN), "0,00%");
    }

    #[test]
    fn test_format_integers_and_decimals() {
        assert_eq!(format_currency(0), "$ 0,00");
        assert_eq!(format_currency(1500), "$ 1.500,00");
        assert_eq!(format_currency(-42_i64), "$ -42,00");
        assert_eq!(format_currency(dec!(1234567.89)), "$ 1.234.567,89");
        assert_eq!(format_currency(dec!(1234567.895)), "$ 1.234.567,90");
        assert_eq!(format_currency(dec!(0.125)), "$ 0,12");
        assert_eq!(format_currency_decimal(dec!(600822115.84)), "$ 600.822.115,84");
        assert_eq!(format_currency_decimal(dec!(7)), "$ 7,00");
    }

    #[test]
    fn test_format_percentage_decimal() {
        assert_eq!(format_percentage(dec!(0.15)), "15,00%");
        assert_eq!(format_percentage_with(dec!(0.1567), 3), "15,670%");
        assert_eq!(format_percentage_with(dec!(0.5), 0), "50%");
        assert_eq!(format_percentage(1), "100,00%");
        assert_eq!(format_percentage(Decimal::MAX), ZERO_PERCENTAGE);
    }

    #[test]
    fn test_parse_monetary_string_formats() {
        assert_eq!(parse_monetary_string("$ 1.234,56"), 1234.56);
        assert_eq!(parse_monetary_string("$1234.56"), 1234.56);
        assert_eq!(parse_monetary_string("1.234,56"), 1234.56);
        assert_eq!(parse_monetary_string("1234,56"), 1234.56);
        assert_eq!(parse_monetary_string("  $ 600.822.115,84 "), 600822115.84);
    }

    #[test]
    fn test_parse_monetary_string_failure() {
        assert_eq!(parse_monetary_string("abc"), 0.0);
        assert_eq!(parse_monetary_string(""), 0.0);
        assert_eq!(parse_monetary_string("1,234,56"), 0.0);
        assert!(matches!(
            try_parse_monetary_string("N/A"),
            Err(FormatError::InvalidAmount(_))
        ));
        assert!(try_parse_monetary_string("inf").is_err());
    }

    #[test]
    fn test_currency_round_trip() {
        let values = [
            0.0, 0.01, 0.1, 1.0, 9.99, 12.5, 999.99, 1000.0, 1234.56, 45678.9,
            1234567.89, 98765432.1, 1_000_000_000.0,
        ];

        for v in values {
            let formatted = format_currency(v);
            let parsed = parse_monetary_string(&formatted);
            assert!(
                (parsed - v).abs() < 0.01,
                "round trip failed for {}: {} → {}",
                v,
                formatted,
                parsed
            );
        }
    }
}
