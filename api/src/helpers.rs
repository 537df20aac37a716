//! Shared numeric helpers for predicted values and their stored form.
//!
//! Predictions are returned and persisted with two decimal places:
//!
//! - `round_2dp`: half-away-from-zero rounding (predicted delay, fare)
//! - `ceil_2dp`: rounds up (`airTime` as stored in the prediction log)
//!
//! Stored values are `NUMERIC(10,2)`, converted with `f64_to_decimal_2dp` and
//! read back with `dec_to_f64`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Round to 2 decimal places.
pub(crate) fn round_2dp(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Round up to 2 decimal places.
pub(crate) fn ceil_2dp(v: f64) -> f64 {
    (v * 100.0).ceil() / 100.0
}

/// A value that has no `Decimal` representation (non-finite or out of range).
#[derive(Debug, Error)]
#[error("{0} cannot be stored as a decimal")]
pub(crate) struct DecimalRangeError(pub(crate) f64);

/// Convert an f64 to Decimal, rounded to 2 decimal places.
pub(crate) fn f64_to_decimal_2dp(v: f64) -> Result<Decimal, DecimalRangeError> {
    Decimal::from_f64(v)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .ok_or(DecimalRangeError(v))
}

/// Convert a Decimal to f64, defaulting to 0.0 for values that can't be represented.
pub(crate) fn dec_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_2dp() {
        assert_eq!(round_2dp(12.3456), 12.35);
        assert_eq!(round_2dp(-3.14159), -3.14);
        assert_eq!(round_2dp(7.0), 7.0);
    }

    #[test]
    fn test_ceil_2dp() {
        assert_eq!(ceil_2dp(120.001), 120.01);
        assert_eq!(ceil_2dp(95.5), 95.5);
    }

    #[test]
    fn test_f64_to_decimal_2dp_normal() {
        assert_eq!(
            f64_to_decimal_2dp(3.14159).unwrap(),
            Decimal::from_str("3.14").unwrap()
        );
        assert_eq!(
            f64_to_decimal_2dp(-7.125).unwrap(),
            Decimal::from_str("-7.13").unwrap()
        );
    }

    #[test]
    fn test_f64_to_decimal_2dp_non_finite() {
        assert!(f64_to_decimal_2dp(f64::NAN).is_err());
        assert!(f64_to_decimal_2dp(f64::INFINITY).is_err());
    }

    #[test]
    fn test_f64_to_decimal_2dp_out_of_range() {
        let err = f64_to_decimal_2dp(1e30).unwrap_err();
        assert_eq!(err.0, 1e30);
    }

    #[test]
    fn test_dec_to_f64() {
        let d = Decimal::from_str("42.17").unwrap();
        assert!((dec_to_f64(d) - 42.17).abs() < 1e-10);
        assert_eq!(dec_to_f64(Decimal::ZERO), 0.0);
    }
}
