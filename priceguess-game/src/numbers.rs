//! Numeric conversion helpers centralizing safe numeric casts and cent math.

use num_traits::cast::cast;

const CENTS_PER_UNIT: f64 = 100.0;

/// Convert a currency amount to whole cents, rounding half away from zero.
/// Returns `None` for negative or non-finite values.
#[must_use]
pub fn price_to_cents(value: f64) -> Option<i64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    cast::<f64, i64>((value * CENTS_PER_UNIT).round())
}

/// Convert whole cents back into a currency amount.
#[must_use]
pub fn cents_to_f64(cents: i64) -> f64 {
    cast::<i64, f64>(cents).unwrap_or(0.0) / CENTS_PER_UNIT
}

/// Round a currency amount to two decimals, leaving non-finite values untouched.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    (value * CENTS_PER_UNIT).round() / CENTS_PER_UNIT
}

/// Percentage error of `guess` against `target`.
///
/// A zero target yields `0.0` for a zero guess and infinity otherwise.
#[must_use]
pub fn percent_error(guess: f64, target: f64) -> f64 {
    let difference = (guess - target).abs();
    if target == 0.0 {
        return if difference == 0.0 { 0.0 } else { f64::INFINITY };
    }
    difference / target.abs() * 100.0
}

/// Rounded `numerator / denominator` as a whole percentage; zero when nothing was attempted.
#[must_use]
pub fn ratio_percent(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let pct = f64::from(numerator) / f64::from(denominator) * 100.0;
    cast::<f64, u32>(pct.round()).unwrap_or(0)
}

/// Convert a collection length to `u32`, saturating on overflow.
#[must_use]
pub fn len_to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_round_half_away_from_zero() {
        assert_eq!(price_to_cents(38.95), Some(3_895));
        assert_eq!(price_to_cents(0.125), Some(13));
        assert_eq!(price_to_cents(0.0), Some(0));
        assert_eq!(price_to_cents(-1.0), None);
        assert_eq!(price_to_cents(f64::NAN), None);
    }

    #[test]
    fn cents_convert_back() {
        assert!((cents_to_f64(12_999) - 129.99).abs() < f64::EPSILON);
        assert!((round_to_cents(1.234_9) - 1.23).abs() < f64::EPSILON);
        assert!(round_to_cents(f64::INFINITY).is_infinite());
    }

    #[test]
    fn percent_error_handles_zero_target() {
        assert!((percent_error(110.0, 100.0) - 10.0).abs() < 1e-9);
        assert!((percent_error(90.0, 100.0) - 10.0).abs() < 1e-9);
        assert!(percent_error(0.0, 0.0).abs() < f64::EPSILON);
        assert!(percent_error(1.0, 0.0).is_infinite());
    }

    #[test]
    fn ratio_percent_rounds() {
        assert_eq!(ratio_percent(6, 9), 67);
        assert_eq!(ratio_percent(3, 0), 0);
        assert_eq!(ratio_percent(6, 6), 100);
    }
}
