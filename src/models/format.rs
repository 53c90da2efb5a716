//! Display helpers for API payloads. Pure string formatting, no state.

/// Compact value label: `950`, `1.5K`, `12K`, `2.3M`.
///
/// One decimal place, with a trailing `.0` dropped.
pub fn format_value(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{}M", one_decimal(n / 1_000_000.0))
    } else if n >= 1_000.0 {
        format!("{}K", one_decimal(n / 1_000.0))
    } else {
        trim_number(n)
    }
}

/// Runtime counter as `m:ss`.
pub fn format_runtime(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn one_decimal(n: f64) -> String {
    let s = format!("{n:.1}");
    match s.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => s,
    }
}

fn trim_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_thresholds() {
        assert_eq!(format_value(950.0), "950");
        assert_eq!(format_value(1_000.0), "1K");
        assert_eq!(format_value(1_500.0), "1.5K");
        assert_eq!(format_value(12_340.0), "12.3K");
        assert_eq!(format_value(2_000_000.0), "2M");
        assert_eq!(format_value(2_360_000.0), "2.4M");
    }

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(0), "0:00");
        assert_eq!(format_runtime(65), "1:05");
        assert_eq!(format_runtime(600), "10:00");
    }
}
