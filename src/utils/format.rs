//! Text formatting for axis ticks, tooltips and legends.

use chrono::NaiveDate;

use crate::types::{BucketKey, Granularity};

/// Format a number without a trailing `.0`, keeping at most two decimals.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Axis tick label with K/M abbreviation for large magnitudes.
pub fn format_tick(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format_number(value)
    }
}

/// `codeSmells` -> `Code Smells`.
pub fn format_metric_name(metric: &str) -> String {
    let mut out = String::with_capacity(metric.len() + 4);
    for (i, ch) in metric.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Short x-axis label for a bucket key.
pub fn format_bucket_label(key: &BucketKey, granularity: Granularity) -> String {
    let raw = key.as_str();
    let label = match granularity {
        Granularity::Daily => parse_day(raw).map(|d| d.format("%b %-d").to_string()),
        Granularity::Weekly => raw
            .split_once("-W")
            .and_then(|(_, week)| week.parse::<u32>().ok())
            .map(|week| format!("Week {}", week)),
        Granularity::Monthly => parse_month(raw).map(|d| d.format("%b").to_string()),
        Granularity::Sprint => parse_day(raw).map(|d| d.format("%-m/%-d/%Y").to_string()),
    };
    label.unwrap_or_else(|| raw.to_string())
}

/// Long date used in tooltips (`5/1/2025`); keys that are not days are
/// shown verbatim.
pub fn format_tooltip_date(key: &str) -> String {
    parse_day(key)
        .map(|d| d.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| key.to_string())
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_month(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(45.0), "45");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(21.666), "21.67");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_format_tick_abbreviates() {
        assert_eq!(format_tick(2_500_000.0), "2.5M");
        assert_eq!(format_tick(1_500.0), "1.5K");
        assert_eq!(format_tick(20.0), "20");
    }

    #[test]
    fn test_format_metric_name() {
        assert_eq!(format_metric_name("codeSmells"), "Code Smells");
        assert_eq!(format_metric_name("bugs"), "Bugs");
        assert_eq!(format_metric_name(""), "");
    }

    #[test]
    fn test_bucket_labels_per_granularity() {
        assert_eq!(
            format_bucket_label(&BucketKey::from("2025-05-01"), Granularity::Daily),
            "May 1"
        );
        assert_eq!(
            format_bucket_label(&BucketKey::from("2025-W07"), Granularity::Weekly),
            "Week 7"
        );
        assert_eq!(
            format_bucket_label(&BucketKey::from("2025-05"), Granularity::Monthly),
            "May"
        );
        assert_eq!(
            format_bucket_label(&BucketKey::from("not-a-date"), Granularity::Daily),
            "not-a-date"
        );
    }

    #[test]
    fn test_tooltip_date() {
        assert_eq!(format_tooltip_date("2025-05-01"), "5/1/2025");
        assert_eq!(format_tooltip_date("2025-W18"), "2025-W18");
    }
}
