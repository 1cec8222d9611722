/// Read a numeric form field the way a browser coerces it: blank text is
/// zero, anything unparsable is NaN. Validation happens later, so this
/// never fails.
pub fn parse_form_number(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// One decimal place, as shown for pace and speed.
pub fn format_metric(value: f64) -> String {
    format!("{:.1}", value)
}

/// Whole numbers without a trailing ".0", otherwise as typed.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_number() {
        assert_eq!(parse_form_number("5"), 5.0);
        assert_eq!(parse_form_number(" 2.5 "), 2.5);
        assert_eq!(parse_form_number(""), 0.0);
        assert_eq!(parse_form_number("   "), 0.0);
        assert!(parse_form_number("abc").is_nan());
        assert!(parse_form_number("-1").is_sign_negative());
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_metric(6.0), "6.0");
        assert_eq!(format_metric(4.615384615), "4.6");
        assert_eq!(format_quantity(30.0), "30");
        assert_eq!(format_quantity(5.25), "5.25");
    }
}
