//! Currency (BRL) input masking.
//!
//! Unmasked values use `.` as the decimal separator; the display form is
//! `R$ 1234,56`.

const PREFIX: &str = "R$";
const DISPLAY_SEPARATOR: char = ',';
const VALUE_SEPARATOR: char = '.';
const MAX_FRACTION_DIGITS: usize = 2;

/// Converts a display value back to its plain decimal form.
pub fn unmask_money(display: &str) -> String {
    let trimmed = display.trim();
    let body = trimmed.strip_prefix(PREFIX).unwrap_or(trimmed);
    body.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| {
            if ch == DISPLAY_SEPARATOR {
                VALUE_SEPARATOR
            } else {
                ch
            }
        })
        .collect()
}

/// Renders a plain decimal value for display. Empty input stays empty.
pub fn mask_money(unmasked: &str) -> String {
    let value = unmasked.trim();
    if value.is_empty() {
        return String::new();
    }
    format!(
        "{PREFIX} {}",
        value.replace(VALUE_SEPARATOR, &DISPLAY_SEPARATOR.to_string())
    )
}

/// Filters the field content after a keystroke and returns what the field
/// should display.
///
/// Characters are accepted one at a time: digits always, a separator only
/// after at least one digit and only once, and fractional digits up to two.
/// Anything else is dropped where it was typed.
pub fn apply_money_keystroke(display_after_insert: &str) -> String {
    let mut accepted = String::new();
    for ch in unmask_money(display_after_insert).chars() {
        if accepts(&accepted, ch) {
            accepted.push(ch);
        }
    }
    mask_money(&accepted)
}

fn accepts(current: &str, ch: char) -> bool {
    if ch == VALUE_SEPARATOR {
        return !current.is_empty() && !current.contains(VALUE_SEPARATOR);
    }
    if !ch.is_ascii_digit() {
        return false;
    }
    match current.split_once(VALUE_SEPARATOR) {
        Some((_, fraction)) => fraction.len() < MAX_FRACTION_DIGITS,
        None => true,
    }
}

/// Parses an unmasked value. Returns `None` for empty or malformed input.
pub fn parse_money(unmasked: &str) -> Option<f64> {
    let value = unmasked.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_and_unmasks_decimal_separator() {
        assert_eq!(mask_money("1500.5"), "R$ 1500,5");
        assert_eq!(unmask_money("R$ 1500,5"), "1500.5");
        assert_eq!(mask_money(""), "");
    }

    #[test]
    fn keystroke_rejects_letters() {
        assert_eq!(apply_money_keystroke("R$ 12a"), "R$ 12");
    }

    #[test]
    fn keystroke_rejects_leading_separator() {
        assert_eq!(apply_money_keystroke(","), "");
        assert_eq!(apply_money_keystroke("."), "");
    }

    #[test]
    fn keystroke_rejects_second_separator() {
        assert_eq!(apply_money_keystroke("R$ 12,5,"), "R$ 12,5");
    }

    #[test]
    fn keystroke_limits_fraction_digits() {
        assert_eq!(apply_money_keystroke("R$ 12,345"), "R$ 12,34");
    }

    #[test]
    fn keystroke_accepts_plain_typing() {
        assert_eq!(apply_money_keystroke("1"), "R$ 1");
        assert_eq!(apply_money_keystroke("R$ 1,"), "R$ 1,");
        assert_eq!(apply_money_keystroke("R$ 1,9"), "R$ 1,9");
    }

    #[test]
    fn filtered_values_are_fixed_points() {
        for input in ["R$ 12,34", "abc", "9,,9", "R$ 0,999", "1.2.3"] {
            let shown = apply_money_keystroke(input);
            assert_eq!(mask_money(&unmask_money(&shown)), shown);
            assert_eq!(apply_money_keystroke(&shown), shown);
        }
    }

    #[test]
    fn parses_unmasked_values() {
        assert_eq!(parse_money("1500.50"), Some(1500.5));
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("abc"), None);
    }
}
