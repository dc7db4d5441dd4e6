//! Numeric conversion helpers centralizing the float/integer crossings the
//! allocators need.

use num_traits::cast::cast;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Widen a collection length to u64.
#[must_use]
pub fn usize_to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Convert a wide weight sum to f64.
#[must_use]
pub fn u128_to_f64(value: u128) -> f64 {
    cast::<u128, f64>(value).unwrap_or(f64::MAX)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Round half-to-even and clamp into the u64 range, returning 0 for NaN and
/// negative values.
#[must_use]
pub fn round_half_even_f64_to_u64(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    cast::<f64, u64>(value.round_ties_even().min(max)).unwrap_or(u64::MAX)
}

/// Floor and clamp into the i64 range, returning 0 for NaN.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Exact `floor(total * weight / sum)` without going through floating point.
///
/// `sum` is carried as u128 so a weight vector whose true sum exceeds
/// `u64::MAX` still divides by the right denominator. Returns 0 when `sum` is
/// zero.
#[must_use]
pub fn scaled_floor(total: u64, weight: u64, sum: u128) -> u64 {
    if sum == 0 {
        return 0;
    }
    let exact = u128::from(total) * u128::from(weight) / sum;
    u64::try_from(exact).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_even_matches_bankers_rounding() {
        assert_eq!(round_half_even_f64_to_u64(2.5), 2);
        assert_eq!(round_half_even_f64_to_u64(3.5), 4);
        assert_eq!(round_half_even_f64_to_u64(1.6), 2);
        assert_eq!(round_half_even_f64_to_u64(f64::NAN), 0);
        assert_eq!(round_half_even_f64_to_u64(-4.0), 0);
    }

    #[test]
    fn floor_handles_negatives_and_nan() {
        assert_eq!(floor_f64_to_i64(9.999), 9);
        assert_eq!(floor_f64_to_i64(-0.5), -1);
        assert_eq!(floor_f64_to_i64(f64::NAN), 0);
        assert_eq!(floor_f64_to_i64(f64::INFINITY), i64::MAX);
    }

    #[test]
    fn scaled_floor_is_exact() {
        assert_eq!(scaled_floor(10, 1, 3), 3);
        assert_eq!(scaled_floor(7, 0, 3), 0);
        assert_eq!(scaled_floor(5, 1, 0), 0);
        assert_eq!(scaled_floor(u64::MAX, 2, 2), u64::MAX);
        let wide = 2 * u128::from(u64::MAX) + 1;
        assert_eq!(scaled_floor(10, u64::MAX, wide), 4);
    }

    #[test]
    fn widening_helpers() {
        assert_eq!(usize_to_u64(42), 42);
        assert!((u128_to_f64(1 << 70) - 2_f64.powi(70)).abs() < 1.0);
    }
}
