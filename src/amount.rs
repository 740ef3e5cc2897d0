//! Conversion of decimal order totals into the processor's minor-unit integers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currencies the processor expects without a fractional part.
pub const ZERO_DECIMAL_CURRENCIES: &[&str] = &["CLP", "JPY", "VND"];

pub fn is_zero_decimal(currency: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES
        .iter()
        .any(|code| code.eq_ignore_ascii_case(currency))
}

/// Converts `amount` into minor units for `currency`.
///
/// Zero-decimal currencies are rounded to whole units, everything else is
/// scaled by 100 and rounded. Midpoints round away from zero. Sign is not
/// checked here; values beyond the `i64` range saturate.
pub fn normalize(amount: Decimal, currency: &str) -> i64 {
    let saturated = if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };

    let scaled = if is_zero_decimal(currency) {
        Some(amount)
    } else {
        amount.checked_mul(Decimal::ONE_HUNDRED)
    };

    scaled
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .unwrap_or(saturated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_two_decimal_currency_is_scaled() {
        assert_eq!(normalize(dec!(25.00), "USD"), 2500);
        assert_eq!(normalize(dec!(10.5), "DKK"), 1050);
    }

    #[test]
    fn test_fractional_cents_round_half_away_from_zero() {
        assert_eq!(normalize(dec!(19.995), "EUR"), 2000);
        assert_eq!(normalize(dec!(19.994), "EUR"), 1999);
    }

    #[test]
    fn test_zero_decimal_currency_is_not_scaled() {
        assert_eq!(normalize(dec!(100), "JPY"), 100);
        assert_eq!(normalize(dec!(1500.5), "CLP"), 1501);
        assert_eq!(normalize(dec!(20000.4), "VND"), 20000);
    }

    #[test]
    fn test_currency_match_ignores_case() {
        assert!(is_zero_decimal("jpy"));
        assert!(!is_zero_decimal("USD"));
    }

    #[test]
    fn test_zero_and_negative_pass_through() {
        assert_eq!(normalize(Decimal::ZERO, "USD"), 0);
        assert_eq!(normalize(dec!(-3.25), "USD"), -325);
        assert_eq!(normalize(dec!(-7), "JPY"), -7);
    }

    #[test]
    fn test_out_of_range_saturates() {
        assert_eq!(normalize(Decimal::MAX, "USD"), i64::MAX);
        assert_eq!(normalize(Decimal::MIN, "JPY"), i64::MIN);
    }
}
