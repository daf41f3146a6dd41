use std::fmt;

/// Input masks used for Brazilian phone numbers.
///
/// `9` marks a digit slot; every other character is a literal inserted while
/// typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneMask {
    /// `(99) 9999-9999`, ten digits.
    Landline,
    /// `(99) 9 9999-9999`, eleven digits with the leading mobile `9`.
    Mobile,
}

const LANDLINE_PATTERN: &str = "(99) 9999-9999";
const MOBILE_PATTERN: &str = "(99) 9 9999-9999";

/// Position of the digit that marks a mobile number (first digit after the
/// two-digit area code).
const MOBILE_MARKER_INDEX: usize = 2;
const MOBILE_MARKER: char = '9';

impl PhoneMask {
    pub fn pattern(self) -> &'static str {
        match self {
            PhoneMask::Landline => LANDLINE_PATTERN,
            PhoneMask::Mobile => MOBILE_PATTERN,
        }
    }

    /// Number of digits a complete value carries under this mask.
    pub fn digit_count(self) -> usize {
        self.pattern().chars().filter(|ch| *ch == '9').count()
    }
}

impl fmt::Display for PhoneMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

/// Strips every non-digit character.
pub fn unmask_phone(display: &str) -> String {
    display.chars().filter(|ch| ch.is_ascii_digit()).collect()
}

/// Chooses the mask from the digit pattern. Called again on every change so
/// typing or deleting the mobile marker switches masks.
pub fn phone_mask_for(digits: &str) -> PhoneMask {
    match digits.chars().nth(MOBILE_MARKER_INDEX) {
        Some(MOBILE_MARKER) => PhoneMask::Mobile,
        _ => PhoneMask::Landline,
    }
}

/// Renders `value` (masked or not) through the mask its digits select.
///
/// Partial values render the filled prefix of the mask; digits beyond the
/// mask capacity are dropped.
pub fn mask_phone(value: &str) -> String {
    let digits = unmask_phone(value);
    let mask = phone_mask_for(&digits);
    let mut remaining = digits.chars().peekable();
    let mut rendered = String::with_capacity(mask.pattern().len());
    let mut pending_literals = String::new();

    for slot in mask.pattern().chars() {
        if remaining.peek().is_none() {
            break;
        }
        if slot == '9' {
            rendered.push_str(&pending_literals);
            pending_literals.clear();
            if let Some(digit) = remaining.next() {
                rendered.push(digit);
            }
        } else {
            pending_literals.push(slot);
        }
    }

    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landline_number_uses_fixed_mask() {
        assert_eq!(phone_mask_for("1133334444"), PhoneMask::Landline);
        assert_eq!(mask_phone("1133334444"), "(11) 3333-4444");
    }

    #[test]
    fn mobile_marker_switches_mask() {
        assert_eq!(phone_mask_for("11987654321"), PhoneMask::Mobile);
        assert_eq!(mask_phone("11987654321"), "(11) 9 8765-4321");
    }

    #[test]
    fn partial_values_render_prefix_only() {
        assert_eq!(mask_phone(""), "");
        assert_eq!(mask_phone("1"), "(1");
        assert_eq!(mask_phone("113"), "(11) 3");
        assert_eq!(mask_phone("119"), "(11) 9");
    }

    #[test]
    fn remasking_a_masked_value_is_stable() {
        let masked = mask_phone("(11) 3333-4444");
        assert_eq!(masked, "(11) 3333-4444");
        assert_eq!(mask_phone(&masked), masked);
    }

    #[test]
    fn mask_then_unmask_restores_digits() {
        for digits in ["1133334444", "11987654321", "2199", "4"] {
            assert_eq!(unmask_phone(&mask_phone(digits)), digits);
        }
    }

    #[test]
    fn extra_digits_are_dropped_by_the_mask() {
        assert_eq!(mask_phone("113333444455"), "(11) 3333-4444");
        assert_eq!(PhoneMask::Landline.digit_count(), 10);
        assert_eq!(PhoneMask::Mobile.digit_count(), 11);
    }
}
