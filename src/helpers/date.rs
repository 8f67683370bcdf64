//! Date helpers

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a date string in the layouts blog posts commonly use
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 with an offset; keep the wall-clock time as written
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Format a date string for display, or return it unchanged if it does not parse
pub fn format_date(s: &str, format: &str) -> String {
    match parse_date(s) {
        Some(dt) => dt.format(format).to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        for s in [
            "2024-01-15",
            "2024/01/15",
            "2024-01-15 10:30",
            "2024-01-15 10:30:00",
            "2024-01-15T10:30:00",
            "2024-01-15T10:30:00.250",
            "2024-01-15T10:30:00+09:00",
        ] {
            let dt = parse_date(s).unwrap_or_else(|| panic!("failed to parse {}", s));
            assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");
        }
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05", "%B %-d, %Y"), "March 5, 2024");
        assert_eq!(format_date("soon", "%Y"), "soon");
    }
}
