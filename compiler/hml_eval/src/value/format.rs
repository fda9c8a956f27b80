//! Float formatting in the style of C's `%g`.

/// Significant digits printed for floats.
const PRECISION: i32 = 6;
/// Digits after the point in the rounded mantissa.
const MANTISSA_DECIMALS: usize = 5;

/// Format a float with six significant digits, trailing zeros removed,
/// switching to exponent form outside `1e-4 ..= 1e6`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Round to the target precision first; the exponent of the rounded
    // value decides the notation.
    let scientific = format!("{value:.prec$e}", prec = MANTISSA_DECIMALS);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            strip_trailing_zeros(mantissa),
            exponent.abs()
        )
    } else {
        let decimals = usize::try_from(PRECISION - 1 - exponent).unwrap_or(0);
        strip_trailing_zeros(&format!("{value:.decimals$}"))
    }
}

fn strip_trailing_zeros(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::format_float;

    #[test]
    fn fixed_notation() {
        assert_eq!(format_float(3.25), "3.25");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(-1.5), "-1.5");
        assert_eq!(format_float(100.0), "100");
        assert_eq!(format_float(123_456.0), "123456");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn exponent_notation() {
        assert_eq!(format_float(1e6), "1e+06");
        assert_eq!(format_float(1_234_567.0), "1.23457e+06");
        assert_eq!(format_float(0.000_01), "1e-05");
        assert_eq!(format_float(-2.5e-10), "-2.5e-10");
    }

    #[test]
    fn special_values() {
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }
}
