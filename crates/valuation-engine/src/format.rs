//! Display formatting for currency amounts, rates and scores

/// Whole-unit amount with thousands separators, e.g. `Rp 1,234,568`
pub fn format_currency(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{symbol} {sign}{grouped}")
}

/// Large amounts in T/B/M units, e.g. `Rp 1.50T`
pub fn format_compact(value: f64, symbol: &str) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000_000_000.0 {
        format!("{symbol} {:.2}T", value / 1_000_000_000_000.0)
    } else if magnitude >= 1_000_000_000.0 {
        format!("{symbol} {:.2}B", value / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("{symbol} {:.2}M", value / 1_000_000.0)
    } else {
        format!("{symbol} {value:.2}")
    }
}

/// Percent number with two decimals, e.g. `15.25%`
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Decimal rate as percent, e.g. `0.1` -> `10.00%`
pub fn format_rate(rate: f64) -> String {
    format_percent(rate * 100.0)
}

/// Screening score with two decimals
pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1_234_567.89, "Rp"), "Rp 1,234,568");
        assert_eq!(format_currency(999.4, "Rp"), "Rp 999");
        assert_eq!(format_currency(1000.0, "$"), "$ 1,000");
        assert_eq!(format_currency(0.0, "Rp"), "Rp 0");
        assert_eq!(format_currency(-25_000.0, "Rp"), "Rp -25,000");
        assert_eq!(format_currency(f64::NAN, "Rp"), "n/a");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(1_500_000_000_000.0, "Rp"), "Rp 1.50T");
        assert_eq!(format_compact(50_000_000_000.0, "$"), "$ 50.00B");
        assert_eq!(format_compact(250_000_000.0, "$"), "$ 250.00M");
        assert_eq!(format_compact(-2_000_000.0, "$"), "$ -2.00M");
        assert_eq!(format_compact(12.5, "$"), "$ 12.50");
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_percent(15.0), "15.00%");
        assert_eq!(format_rate(0.125), "12.50%");
        assert_eq!(format_score(85.0), "85.00");
        assert_eq!(format_score(43.999), "44.00");
    }
}
