//! Formats an `f64` the way CPython's `repr(float)` does: plain decimal
//! notation for "normal" magnitudes, scientific notation with a signed,
//! zero-padded exponent outside of `[1e-4, 1e16)`, and always at least one
//! digit after the decimal point.

pub fn to_string(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0".to_string() } else { "0.0".to_string() };
    }

    let abs = value.abs();
    if (1e-4..1e16).contains(&abs) {
        format_fixed(value)
    } else {
        format_scientific(value)
    }
}

fn format_fixed(value: f64) -> String {
    let mut s = format!("{value}");
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

fn format_scientific(value: f64) -> String {
    let s = format!("{value:e}");
    let pos = s.find('e').expect("scientific format always has an exponent");
    let (mantissa, exp) = (&s[..pos], &s[pos + 1..]);
    let exp_num: i32 = exp.parse().expect("exponent is a valid integer");
    let sign = if exp_num < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp_num.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_keep_a_decimal_point() {
        assert_eq!(to_string(1.0), "1.0");
        assert_eq!(to_string(-2.0), "-2.0");
    }

    #[test]
    fn small_fractions_stay_fixed() {
        assert_eq!(to_string(0.1), "0.1");
    }

    #[test]
    fn large_magnitudes_use_scientific_notation() {
        assert_eq!(to_string(1e16), "1e+16");
    }

    #[test]
    fn tiny_magnitudes_use_scientific_notation() {
        assert_eq!(to_string(1e-5), "1e-05");
    }
}
