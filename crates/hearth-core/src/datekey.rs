//! `YYYY-MM-DD` day keys.
//!
//! Keys are always built from the calendar fields of a [`NaiveDate`]. A
//! `NaiveDate` carries no offset, so formatting can never slide a key onto the
//! neighbouring day the way a UTC conversion near midnight would.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::CalendarError;

const DATE_KEY_LEN: usize = 10;

#[must_use]
pub fn format_date_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parses a canonical key. Anything that would not format back to the same
/// string (missing zero padding, trailing time part, bad day) is rejected.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, CalendarError> {
    let invalid = || CalendarError::InvalidDateKey {
        raw: key.to_string(),
    };

    if key.len() != DATE_KEY_LEN {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| invalid())?;
    if format_date_key(date) != key {
        return Err(invalid());
    }
    Ok(date)
}

/// The day-key portion of a raw date or date-time string: its first ten
/// characters. Empty input has no key.
#[must_use]
pub fn date_key_prefix(raw: &str) -> Option<&str> {
    if raw.is_empty() {
        return None;
    }
    let end = raw
        .char_indices()
        .nth(DATE_KEY_LEN)
        .map_or(raw.len(), |(idx, _)| idx);
    Some(&raw[..end])
}

/// Today's date from the local wall clock.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[must_use]
pub fn today_key() -> String {
    format_date_key(today())
}
