// Forgiving parsing and number formatting.
//
// Enforcement spreadsheets arrive with inconsistent cells (blank fines,
// thousands separators, stray unit suffixes), so all the tolerant handling
// lives here and the rest of the code works with clean values.
use num_format::{Locale, ToFormattedString};

/// Parse a fine cell into a monetary amount, defaulting to 0.
///
/// Mirrors the tolerance of spreadsheet tooling: trims whitespace, strips
/// thousands separators, and accepts a leading numeric prefix (`"1500 LKR"`
/// parses as 1500). Anything else is treated as no fine at all.
pub fn parse_fine(s: Option<&str>) -> f64 {
    let Some(s) = s else { return 0.0 };
    let t = s.trim().replace(',', "");
    if t.is_empty() {
        return 0.0;
    }
    match t.parse::<f64>() {
        Ok(v) => v,
        Err(_) => leading_float(&t).unwrap_or(0.0),
    }
}

/// Longest leading `[+-]?digits[.digits]` prefix of `s`, parsed as `f64`.
fn leading_float(s: &str) -> Option<f64> {
    let mut end = 0usize;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => end = i + 1,
            '0'..='9' => {
                seen_digit = true;
                end = i + 1;
            }
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse::<f64>().ok()
}

/// Normalize an optional text field: trimmed, with empty/missing values
/// replaced by `fallback`.
pub fn field_or(s: Option<&str>, fallback: &str) -> String {
    match s.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => fallback.to_string(),
    }
}

/// Format a monetary amount with grouping separators (`1,234,567`), keeping
/// two decimals only when the amount is not whole.
pub fn format_amount(n: f64) -> String {
    let neg = n < 0.0;
    let cents = (n.abs() * 100.0).round() as i64;
    let mut res = (cents / 100).to_formatted_string(&Locale::en);
    let rem = cents % 100;
    if rem != 0 {
        res.push_str(&format!(".{:02}", rem));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Grouping separators for plain counts (`9,855`).
pub fn format_count<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fine_handles_clean_numbers() {
        assert_eq!(parse_fine(Some("100")), 100.0);
        assert_eq!(parse_fine(Some("  2500.50 ")), 2500.5);
        assert_eq!(parse_fine(Some("1,500")), 1500.0);
    }

    #[test]
    fn parse_fine_accepts_numeric_prefix() {
        assert_eq!(parse_fine(Some("1500 LKR")), 1500.0);
        assert_eq!(parse_fine(Some("-250.5x")), -250.5);
    }

    #[test]
    fn parse_fine_defaults_to_zero() {
        assert_eq!(parse_fine(None), 0.0);
        assert_eq!(parse_fine(Some("")), 0.0);
        assert_eq!(parse_fine(Some("waived")), 0.0);
        assert_eq!(parse_fine(Some("-")), 0.0);
    }

    #[test]
    fn field_or_falls_back_on_blank() {
        assert_eq!(field_or(Some(" 5 "), "Unknown"), "5");
        assert_eq!(field_or(Some("   "), "Unknown"), "Unknown");
        assert_eq!(field_or(None, "Unspecified"), "Unspecified");
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(150.0), "150");
        assert_eq!(format_amount(1234567.0), "1,234,567");
        assert_eq!(format_amount(1500.25), "1,500.25");
        assert_eq!(format_amount(-9000.0), "-9,000");
    }

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(9855u64), "9,855");
        assert_eq!(format_count(3u64), "3");
    }
}
