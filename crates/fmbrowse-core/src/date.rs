//! Date normalization for find criteria
//!
//! Find requests expect dates in the server's native `MM/DD/YYYY` form.
//! Callers may hand us either that form or ISO `YYYY-MM-DD` (optionally with
//! a time component, which is dropped).

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate};

const FILEMAKER_FORMAT: &str = "%m/%d/%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

/// Convert a caller-supplied date into `MM/DD/YYYY`.
///
/// # Examples
/// ```
/// use fmbrowse_core::date::to_filemaker_date;
///
/// assert_eq!(to_filemaker_date("2024-01-31").unwrap(), "01/31/2024");
/// assert_eq!(to_filemaker_date("01/31/2024").unwrap(), "01/31/2024");
/// assert!(to_filemaker_date("31/01/2024").is_err());
/// ```
pub fn to_filemaker_date(input: &str) -> Result<String> {
    parse_date(input).map(|date| date.format(FILEMAKER_FORMAT).to_string())
}

/// Parse a caller-supplied date in any of the accepted forms.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    parse_any(input).ok_or_else(|| Error::InvalidDate(input.to_string()))
}

/// Parse a stored `MM/DD/YYYY` field value, `None` when it is not one.
pub fn parse_filemaker_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), FILEMAKER_FORMAT).ok()
}

fn parse_any(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    NaiveDate::parse_from_str(input, ISO_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, FILEMAKER_FORMAT))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_date_converted() {
        assert_eq!(to_filemaker_date("2024-01-01").unwrap(), "01/01/2024");
        assert_eq!(to_filemaker_date(" 2023-12-25 ").unwrap(), "12/25/2023");
    }

    #[test]
    fn test_native_date_passes_through_padded() {
        assert_eq!(to_filemaker_date("01/31/2024").unwrap(), "01/31/2024");
        assert_eq!(to_filemaker_date("1/5/2024").unwrap(), "01/05/2024");
    }

    #[test]
    fn test_rfc3339_timestamp_uses_date_part() {
        assert_eq!(
            to_filemaker_date("2024-02-29T10:15:00+00:00").unwrap(),
            "02/29/2024"
        );
    }

    #[test]
    fn test_parse_date_accepts_both_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_date("3/9/2024").unwrap(), expected);
    }

    #[test]
    fn test_stored_dates_only_in_native_form() {
        assert_eq!(
            parse_filemaker_date("12/31/2023"),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(parse_filemaker_date("2023-12-31"), None);
        assert_eq!(parse_filemaker_date(""), None);
    }

    #[test]
    fn test_invalid_dates_rejected() {
        for bad in ["", "yesterday", "2024-02-30", "13/01/2024", "2024/01/01"] {
            let err = to_filemaker_date(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidDate(_)), "{bad} should fail");
        }
    }
}
