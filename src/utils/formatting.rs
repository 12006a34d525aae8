//! Formatting utilities used for CLI and export outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Readable duration: `02h 05m`.
pub fn mins2readable(mins: i64) -> String {
    let m = mins.abs();
    let sign = if mins < 0 { "-" } else { "" };
    format!("{}{:02}h {:02}m", sign, m / 60, m % 60)
}

pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

pub fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_minutes() {
        assert_eq!(mins2readable(125), "02h 05m");
        assert_eq!(mins2readable(0), "00h 00m");
        assert_eq!(mins2readable(-30), "-00h 30m");
    }

    #[test]
    fn missing_values_show_a_dash() {
        assert_eq!(or_dash(None), "--");
        assert_eq!(or_dash(Some("2025-05-01".into())), "2025-05-01");
    }
}
