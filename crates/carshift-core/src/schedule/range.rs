//! Hour-range expressions.

use crate::error::ValidationError;

/// Expand `"08-12"` into hours `[8, 9, 10, 11]`.
///
/// The end hour is exclusive. An end at or before the start wraps past
/// midnight, so `"22-02"` yields `[22, 23, 0, 1]` and `"08-08"` covers a
/// full day.
pub fn parse_hour_range(expr: &str) -> Result<Vec<u8>, ValidationError> {
    let invalid = || ValidationError::InvalidHourRange(expr.to_string());

    let (start, end) = expr.trim().split_once('-').ok_or_else(invalid)?;
    let start = parse_hour_number(start).ok_or_else(invalid)?;
    let mut end = parse_hour_number(end).ok_or_else(invalid)?;
    if start > 23 || end > 24 {
        return Err(invalid());
    }
    if end <= start {
        end += 24;
    }

    Ok((start..end).map(|h| (h % 24) as u8).collect())
}

/// Accept either a range (`"08-12"`), a label (`"08:00"`) or a bare hour (`"8"`).
pub fn parse_hours(expr: &str) -> Result<Vec<u8>, ValidationError> {
    let expr = expr.trim();
    if expr.contains('-') {
        return parse_hour_range(expr);
    }
    let hour_part = expr.split_once(':').map(|(h, _)| h).unwrap_or(expr);
    match parse_hour_number(hour_part) {
        Some(h) if h <= 23 => Ok(vec![h as u8]),
        _ => Err(ValidationError::InvalidHourRange(expr.to_string())),
    }
}

/// `8` -> `"08:00"`.
pub fn hour_label(hour: u8) -> String {
    format!("{hour:02}:00")
}

fn parse_hour_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || s.len() > 2 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_range_is_end_exclusive() {
        assert_eq!(parse_hour_range("08-12").unwrap(), vec![8, 9, 10, 11]);
        assert_eq!(parse_hour_range("0-1").unwrap(), vec![0]);
    }

    #[test]
    fn range_wraps_past_midnight() {
        assert_eq!(parse_hour_range("22-02").unwrap(), vec![22, 23, 0, 1]);
        assert_eq!(parse_hour_range("08-08").unwrap().len(), 24);
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        for bad in ["", "8", "a-b", "08-", "25-02", "123-4", "08-30"] {
            assert!(parse_hour_range(bad).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn single_hours_and_labels() {
        assert_eq!(parse_hours("08:00").unwrap(), vec![8]);
        assert_eq!(parse_hours("7").unwrap(), vec![7]);
        assert_eq!(parse_hours("23-01").unwrap(), vec![23, 0]);
        assert!(parse_hours("24").is_err());
    }

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(hour_label(8), "08:00");
        assert_eq!(hour_label(23), "23:00");
    }
}
