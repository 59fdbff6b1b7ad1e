//! Number display shared by the checker (enum keys) and the evaluator.

/// Format a number the way the language prints it: integral values have no
/// fractional part, non-finite values use their names.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        // -0 prints as 0
        return "0".to_owned();
    }
    if n.abs() >= 1e21 {
        return format!("{:e}", n).replacen('e', "e+", 1);
    }
    // Rust prints integral floats without a fraction and never in exponent
    // form below 1e21.
    format!("{}", n)
}

#[cfg(test)]
mod tests {
    use super::format_number;

    #[test]
    fn integral_values_have_no_fraction() {
        assert_eq!(format_number(56.0), "56");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn large_integers_keep_every_digit() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(-9.3e18), "-9300000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
    }

    #[test]
    fn fractions_and_specials() {
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }
}
