/// Field validation rules shared by the HTTP handlers
use crate::error::{CadenceError, Result};
use chrono::NaiveDate;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;
pub const NEWS_MIN_WORDS: usize = 500;

pub const DURATION_FORMAT_ERROR: &str = "Invalid duration format. Use MM:SS.";
pub const RELEASE_DATE_FORMAT_ERROR: &str = "Invalid release date format. Use YYYY-MM-DD.";

/// Parse `MM:SS` into total seconds. Seconds must be below 60.
pub fn parse_duration(input: &str) -> Result<i64> {
    let invalid = || CadenceError::invalid_input(DURATION_FORMAT_ERROR);

    let (minutes, seconds) = input.trim().split_once(':').ok_or_else(invalid)?;
    if minutes.is_empty()
        || seconds.len() != 2
        || !minutes.bytes().all(|b| b.is_ascii_digit())
        || !seconds.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: i64 = seconds.parse().map_err(|_| invalid())?;
    if seconds >= 60 {
        return Err(invalid());
    }

    Ok(minutes * 60 + seconds)
}

/// Render total seconds as `M:SS`
pub fn format_duration(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_release_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| CadenceError::invalid_input(RELEASE_DATE_FORMAT_ERROR))
}

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.trim().chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(CadenceError::invalid_input(format!(
            "Username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn validate_news_content(content: &str) -> Result<()> {
    if word_count(content) < NEWS_MIN_WORDS {
        return Err(CadenceError::invalid_input(format!(
            "Content must be at least {NEWS_MIN_WORDS} words."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_minutes_and_seconds() {
        assert_eq!(parse_duration("5:54").unwrap(), 354);
        assert_eq!(parse_duration("00:07").unwrap(), 7);
        assert_eq!(parse_duration("120:00").unwrap(), 7200);
    }

    #[test]
    fn rejects_malformed_durations() {
        for input in ["", "5", "5:6", "5:60", "a:10", "5:1a", ":30", "1:2:3", "-1:00"] {
            let err = parse_duration(input).unwrap_err();
            assert_eq!(err.to_string(), DURATION_FORMAT_ERROR, "input {input:?}");
        }
    }

    #[test]
    fn formats_with_padded_seconds() {
        assert_eq!(format_duration(354), "5:54");
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(9), "0:09");
    }

    #[test]
    fn release_dates_must_be_iso() {
        assert!(parse_release_date("2024-02-29").is_ok());
        assert!(parse_release_date("2023-02-29").is_err());
        assert!(parse_release_date("29/02/2024").is_err());
    }

    #[test]
    fn username_length_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"x".repeat(30)).is_ok());
        assert!(validate_username(&"x".repeat(31)).is_err());
    }

    #[test]
    fn news_content_needs_enough_words() {
        let short = "word ".repeat(NEWS_MIN_WORDS - 1);
        let long = "word ".repeat(NEWS_MIN_WORDS);
        assert_eq!(
            validate_news_content(&short).unwrap_err().to_string(),
            "Content must be at least 500 words."
        );
        assert!(validate_news_content(&long).is_ok());
    }

    proptest! {
        #[test]
        fn formatted_durations_parse_back(seconds in 0i64..1_000_000) {
            prop_assert_eq!(parse_duration(&format_duration(seconds)).unwrap(), seconds);
        }
    }
}
