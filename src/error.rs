// ⚠️ Formatter errors
// The formatting layer is fail-soft at display call sites; these are the
// explicit failures behind each `try_*` variant.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("value is not a finite number: {0}")]
    NonFinite(f64),

    #[error("value has no exact decimal representation: {0}")]
    Decimal(String),

    #[error("invalid monetary amount: {0:?}")]
    InvalidAmount(String),

    #[error("unrecognised date: {0:?}")]
    InvalidDate(String),
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Reject NaN and infinities before any formatting happens
pub(crate) fn ensure_finite(value: f64) -> FormatResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormatError::NonFinite(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite(1.5), Ok(1.5));
        assert!(matches!(ensure_finite(f64::INFINITY), Err(FormatError::NonFinite(_))));
        assert!(ensure_finite(f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = FormatError::InvalidAmount("abc".to_string());
        assert_eq!(err.to_string(), "invalid monetary amount: \"abc\"");

        let err = FormatError::InvalidDate("32/13/2024".to_string());
        assert!(err.to_string().contains("32/13/2024"));
    }
}
