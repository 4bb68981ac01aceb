//! Fractional input validation
//!
//! A best-effort guard on the quantity field: anything that does not read as
//! a number at or above the minimum is replaced by the minimum. The cart
//! service stays the authority on what it accepts.

/// Minimum used when the field carries no usable `min` attribute
pub const DEFAULT_MIN: f64 = 0.01;

/// Outcome of validating a field value
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// Value is acceptable and stays as typed
    Accepted,
    /// Value must be replaced
    Clamped {
        /// Replacement field text
        value: String,
    },
}

impl Validation {
    /// Field text after validation
    #[inline]
    #[must_use]
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        match self {
            Self::Accepted => raw,
            Self::Clamped { value } => value,
        }
    }
}

/// Validate a raw field value against the field's `min` attribute
///
/// Parsing reads the longest leading decimal, so `"2.5kg"` counts as 2.5 and
/// is left as typed.
#[must_use]
pub fn validate(raw: &str, min_attribute: Option<&str>, fallback_min: f64) -> Validation {
    let min = minimum(min_attribute, fallback_min);
    match parse_decimal_prefix(raw) {
        Some(value) if value >= min => Validation::Accepted,
        _ => Validation::Clamped {
            value: format_decimal(min),
        },
    }
}

/// Effective minimum for a field
#[must_use]
pub fn minimum(min_attribute: Option<&str>, fallback_min: f64) -> f64 {
    min_attribute
        .and_then(parse_decimal_prefix)
        .unwrap_or(fallback_min)
}

/// Parse the longest leading decimal number
///
/// Accepts optional surrounding whitespace, a sign, digits with at most one
/// decimal point, and an exponent. Returns `None` when no digit leads or the
/// value overflows to infinity.
#[must_use]
pub fn parse_decimal_prefix(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse().ok().filter(|v: &f64| v.is_finite())
}

/// Render a minimum the way it is written back into the field
#[must_use]
pub fn format_decimal(value: f64) -> String {
    format!("{value}")
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_plain_and_prefixed_decimals() {
        assert_eq!(parse_decimal_prefix("2.5"), Some(2.5));
        assert_eq!(parse_decimal_prefix("  3"), Some(3.0));
        assert_eq!(parse_decimal_prefix(".75"), Some(0.75));
        assert_eq!(parse_decimal_prefix("4."), Some(4.0));
        assert_eq!(parse_decimal_prefix("2.5kg"), Some(2.5));
        assert_eq!(parse_decimal_prefix("1e2"), Some(100.0));
        assert_eq!(parse_decimal_prefix("1e"), Some(1.0));
        assert_eq!(parse_decimal_prefix("-0.5"), Some(-0.5));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert_eq!(parse_decimal_prefix(""), None);
        assert_eq!(parse_decimal_prefix("abc"), None);
        assert_eq!(parse_decimal_prefix("."), None);
        assert_eq!(parse_decimal_prefix("-"), None);
        assert_eq!(parse_decimal_prefix("kg 2"), None);
    }

    #[test]
    fn non_numeric_clamps_to_default_min() {
        let result = validate("abc", None, DEFAULT_MIN);
        assert_eq!(
            result,
            Validation::Clamped {
                value: "0.01".to_string()
            }
        );
    }

    #[test]
    fn below_min_clamps_to_attribute() {
        let result = validate("0.1", Some("0.25"), DEFAULT_MIN);
        assert_eq!(result.resolve("0.1"), "0.25");
    }

    #[test]
    fn whole_minimum_renders_without_fraction() {
        let result = validate("0", Some("1"), DEFAULT_MIN);
        assert_eq!(result.resolve("0"), "1");
    }

    #[test]
    fn at_or_above_min_is_kept() {
        assert_eq!(validate("0.01", None, DEFAULT_MIN), Validation::Accepted);
        assert_eq!(validate("3.0", Some("0.5"), DEFAULT_MIN), Validation::Accepted);
    }

    #[test]
    fn overflowing_and_infinite_input_clamps() {
        assert_eq!(parse_decimal_prefix("1e400"), None);
        assert_eq!(parse_decimal_prefix("Infinity"), None);
        assert_eq!(parse_decimal_prefix("-1e400"), None);

        assert_eq!(validate("1e400", Some("0.5"), DEFAULT_MIN).resolve("1e400"), "0.5");
        assert_eq!(validate("Infinity", None, DEFAULT_MIN).resolve("Infinity"), "0.01");
        assert_eq!(validate("1e300", None, DEFAULT_MIN), Validation::Accepted);
    }

    #[test]
    fn unusable_min_attribute_falls_back() {
        assert_eq!(minimum(Some(""), DEFAULT_MIN), DEFAULT_MIN);
        assert_eq!(minimum(Some("n/a"), 0.5), 0.5);
        assert_eq!(minimum(Some("0.2"), 0.5), 0.2);
    }

    proptest! {
        #[test]
        fn prop_validation_is_idempotent(raw in "\\PC{0,12}", min in 0.01f64..100.0) {
            let min_attr = format_decimal(min);
            let first = validate(&raw, Some(&min_attr), DEFAULT_MIN);
            let once = first.resolve(&raw).to_string();
            let second = validate(&once, Some(&min_attr), DEFAULT_MIN);
            prop_assert_eq!(second, Validation::Accepted);
        }

        #[test]
        fn prop_accepted_values_are_at_least_min(
            value in -1000.0f64..1000.0,
            min in 0.01f64..100.0,
        ) {
            let raw = format_decimal(value);
            let min_attr = format_decimal(min);
            match validate(&raw, Some(&min_attr), DEFAULT_MIN) {
                Validation::Accepted => prop_assert!(value >= min),
                Validation::Clamped { value: clamped } => {
                    prop_assert!(value < min);
                    prop_assert_eq!(clamped, min_attr);
                }
            }
        }
    }
}
