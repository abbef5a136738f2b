//! Fixed-precision number formatting for G-code words.
//!
//! Every numeric word in a generated program goes through [`fmt_num`], so
//! one output never mixes precisions.

/// Number of decimal places written for every numeric G-code word.
pub const DECIMALS: usize = 3;

/// Format a value with [`DECIMALS`] places.
///
/// Values that would round to zero are written as `0.000`, never `-0.000`.
pub fn fmt_num(value: f64) -> String {
    let half_ulp = 0.5 * 10f64.powi(-(DECIMALS as i32));
    let value = if value.abs() < half_ulp { 0.0 } else { value };
    format!("{:.*}", DECIMALS, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_precision() {
        assert_eq!(fmt_num(4.0), "4.000");
        assert_eq!(fmt_num(1.02), "1.020");
        assert_eq!(fmt_num(-10.01), "-10.010");
        assert_eq!(fmt_num(1200.0), "1200.000");
    }

    #[test]
    fn test_negative_zero_is_normalised() {
        assert_eq!(fmt_num(-0.0), "0.000");
        assert_eq!(fmt_num(-0.0004), "0.000");
        assert_eq!(fmt_num(3.0e-17), "0.000");
    }
}
