//! Dot-grouped integers (`1.234.567`)

/// Largest accepted value: the upper bound of a SQLite `INTEGER` column
pub const MAX_GROUPED: u64 = i64::MAX as u64;

/// Validates and parses a dot-grouped digit string
///
/// The leftmost group holds 1–3 digits and every following group exactly 3.
/// Returns `None` for any other shape, for non-ASCII digits, and when the
/// value exceeds [`MAX_GROUPED`].
///
/// # Examples
///
/// ```
/// use car_harvest::normalize::parse_grouped;
///
/// assert_eq!(parse_grouped("1.000.000"), Some(1_000_000));
/// assert_eq!(parse_grouped("49.54"), None);
/// assert_eq!(parse_grouped("1000"), None);
/// ```
pub fn parse_grouped(text: &str) -> Option<u64> {
    let mut groups = text.split('.');

    let head = groups.next()?;
    if head.is_empty() || head.len() > 3 || !is_ascii_digits(head) {
        return None;
    }

    let mut digits = String::with_capacity(text.len());
    digits.push_str(head);

    for group in groups {
        if group.len() != 3 || !is_ascii_digits(group) {
            return None;
        }
        digits.push_str(group);
    }

    digits
        .parse::<u64>()
        .ok()
        .filter(|value| *value <= MAX_GROUPED)
}

fn is_ascii_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
