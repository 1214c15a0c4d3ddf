use super::types::TimeSavings;

/// US-dollar display string with two decimals and comma grouping, e.g. `$1,896.20`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0.00".to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

pub fn format_time_savings(savings: &TimeSavings) -> String {
    format!("{}y {}m", savings.years, savings.months)
}

/// Parses form text such as `"300,000"` or `"$1,250.50"`.
///
/// Grouping separators are ignored. Returns `None` unless the remaining text is
/// a finite, non-negative number.
pub fn parse_numeric_input(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value = cleaned.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    while value >= 1_000 {
        groups.push(format!("{:03}", value % 1_000));
        value /= 1_000;
    }
    groups.push(value.to_string());
    groups.reverse();
    groups.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_currency_groups_thousands_and_rounds_to_cents() {
        assert_eq!(format_currency(1_896.204_070_478_896), "$1,896.20");
        assert_eq!(format_currency(382_633.4654), "$382,633.47");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(7.5), "$7.50");
    }

    #[test]
    fn format_currency_handles_negative_and_non_finite_values() {
        assert_eq!(format_currency(-12.5), "-$12.50");
        assert_eq!(format_currency(-0.001), "$0.00");
        assert_eq!(format_currency(f64::NAN), "$0.00");
        assert_eq!(format_currency(f64::INFINITY), "$0.00");
    }

    #[test]
    fn format_time_savings_uses_years_and_months() {
        assert_eq!(format_time_savings(&TimeSavings::from_months(150)), "12y 6m");
        assert_eq!(format_time_savings(&TimeSavings::default()), "0y 0m");
    }

    #[test]
    fn parse_numeric_input_strips_grouping_separators() {
        assert_eq!(parse_numeric_input("300,000"), Some(300_000.0));
        assert_eq!(parse_numeric_input(" $1,250.50 "), Some(1_250.5));
        assert_eq!(parse_numeric_input("6.5"), Some(6.5));
        assert_eq!(parse_numeric_input("1_000"), Some(1_000.0));
        assert_eq!(parse_numeric_input("0"), Some(0.0));
    }

    #[test]
    fn parse_numeric_input_rejects_non_numeric_and_negative_text() {
        for text in ["", "   ", "abc", "-5", "1.2.3", "inf", "NaN", "1e5", "12a"] {
            assert_eq!(parse_numeric_input(text), None, "input {text:?}");
        }
    }
}
