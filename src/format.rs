pub const NO_DATA_LABEL: &str = "No data";

/// Human-readable dollar amount: trillion / billion / million with two
/// decimals, otherwise a comma-grouped whole number. Absent, NaN and
/// infinite values read "No data".
pub fn format_magnitude(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return NO_DATA_LABEL.to_string();
    };

    if v >= 1e12 {
        format!("${:.2} trillion", v / 1e12)
    } else if v >= 1e9 {
        format!("${:.2} billion", v / 1e9)
    } else if v >= 1e6 {
        format!("${:.2} million", v / 1e6)
    } else {
        format!("${}", group_thousands(v))
    }
}

/// `1234567.8` → `"1,234,568"`.
fn group_thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn magnitudes() {
        assert_eq!(format_magnitude(Some(2.5e13)), "$25.00 trillion");
        assert_eq!(format_magnitude(Some(1e12)), "$1.00 trillion");
        assert_eq!(format_magnitude(Some(8e10)), "$80.00 billion");
        assert_eq!(format_magnitude(Some(1_234_567.0)), "$1.23 million");
        assert_eq!(format_magnitude(Some(999_999.4)), "$999,999");
        assert_eq!(format_magnitude(Some(1_000.0)), "$1,000");
        assert_eq!(format_magnitude(Some(999.0)), "$999");
    }

    #[test]
    fn zero_is_a_value_not_missing() {
        assert_eq!(format_magnitude(Some(0.0)), "$0");
    }

    #[test]
    fn missing_values() {
        assert_eq!(format_magnitude(None), NO_DATA_LABEL);
        assert_eq!(format_magnitude(Some(f64::NAN)), NO_DATA_LABEL);
        assert_eq!(format_magnitude(Some(f64::INFINITY)), NO_DATA_LABEL);
    }

    #[test]
    fn negative_small_values_keep_their_sign() {
        assert_eq!(format_magnitude(Some(-12_345.0)), "$-12,345");
    }

    proptest! {
        #[test]
        fn finite_non_negative_values_always_format(v in 0.0f64..1e300) {
            let s = format_magnitude(Some(v));
            prop_assert!(s.starts_with('$'));
            prop_assert_ne!(s, NO_DATA_LABEL);
        }
    }
}
