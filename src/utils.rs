//! Utility functions used across the library

/// Restrict value to a certain interval
#[inline]
pub fn clamp<T>(val: T, min: T, max: T) -> T
where
    T: PartialOrd,
{
    if val < min {
        min
    } else if val > max {
        max
    } else {
        val
    }
}

/// Integer division rounded to the nearest integer, halfs are rounded away from zero.
///
/// `den` must be positive. Wide enough for a product of two `i64` differences of
/// `i32` coordinates.
#[inline]
pub(crate) fn div_round(num: i128, den: i128) -> i128 {
    debug_assert!(den > 0);
    if num >= 0 {
        (num + den / 2) / den
    } else {
        -((-num + den / 2) / den)
    }
}

/// Clamp integer into `i32` range
#[inline]
pub(crate) fn saturate_i32(value: impl Into<i128>) -> i32 {
    clamp(value.into(), i32::MIN as i128, i32::MAX as i128) as i32
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[macro_export]
    macro_rules! assert_approx_eq {
        ( $v0:expr, $v1: expr ) => {{
            assert!(($v0 - $v1).abs() < 1e-6, "{} != {}", $v0, $v1);
        }};
        ( $v0:expr, $v1: expr, $e: expr ) => {{
            assert!(($v0 - $v1).abs() < $e, "{} != {}", $v0, $v1);
        }};
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 0, 3), 3);
        assert_eq!(clamp(-5, 0, 3), 0);
        assert_eq!(clamp(2, 0, 3), 2);
    }

    #[test]
    fn test_div_round() {
        assert_eq!(div_round(5, 10), 1);
        assert_eq!(div_round(4, 10), 0);
        assert_eq!(div_round(-5, 10), -1);
        assert_eq!(div_round(-4, 10), 0);
        assert_eq!(div_round(30, 10), 3);
        assert_eq!(div_round(7, 3), 2);

        // full i32 span in both directions
        let span = i32::MAX as i128 - i32::MIN as i128;
        assert_eq!(div_round(span * span, span), span);
        assert_eq!(div_round(-span * span, span), -span);
        assert_eq!(div_round(span * (span - 1), span), span - 1);
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate_i32(i64::MAX), i32::MAX);
        assert_eq!(saturate_i32(i64::MIN), i32::MIN);
        assert_eq!(saturate_i32(-17), -17);
        assert_eq!(saturate_i32(i128::MAX), i32::MAX);
        assert_eq!(saturate_i32(u64::MAX as i128), i32::MAX);
    }
}
