use chrono::NaiveDate;

/// The registration system writes this placeholder for "no date".
pub const SENTINEL_DATE: &str = "0001-01-01";

pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{a0}'], " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Parses an export date cell; blanks, the sentinel and garbage are absent.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == SENTINEL_DATE {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    // Some exports carry a time component after the date.
    trimmed
        .get(..10)
        .filter(|prefix| *prefix != SENTINEL_DATE)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

pub fn is_valid_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Renders a date for a report cell, empty when absent.
pub fn get_date(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Clinic "taken" flags are `Yes`/`yes`/`YES`; everything else means no.
pub(crate) fn is_yes(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_and_blank_dates_are_absent() {
        for value in [SENTINEL_DATE, "", "   ", "not-a-date", "2023-13-40"] {
            assert!(!is_valid_date(value), "{value:?} should be invalid");
            assert_eq!(get_date(parse_date(value)), "");
        }
    }

    #[test]
    fn dates_with_time_suffix_are_accepted() {
        assert_eq!(
            parse_date("2023-10-14 00:00:00"),
            NaiveDate::from_ymd_opt(2023, 10, 14)
        );
        assert_eq!(parse_date("0001-01-01T00:00:00"), None);
        assert_eq!(get_date(parse_date(" 2024-01-07 ")), "2024-01-07");
    }

    #[test]
    fn yes_flags_ignore_case() {
        assert!(is_yes("Yes"));
        assert!(is_yes(" YES "));
        assert!(is_yes("yes"));
        assert!(!is_yes("No"));
        assert!(!is_yes(""));
        assert!(!is_yes("y"));
    }

    #[test]
    fn headers_collapse_whitespace_and_case() {
        assert_eq!(
            normalize_header("\u{feff}Registration   Id"),
            "registration id"
        );
        assert_eq!(
            normalize_header("Chief Timekeeper-Deck Evaluation #1 Date"),
            "chief timekeeper-deck evaluation #1 date"
        );
    }
}
