//! Parsing and formatting of the `YYYYMMDD` calendar-day encoding.

use std::fmt::Write as _;
use thiserror::Error;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]");

/// Errors raised when a date string cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Input is not exactly 8 digits encoding a real calendar date.
    #[error("invalid calendar date {0:?}, expected YYYYMMDD")]
    Format(String),
}

/// Parse an 8-digit `YYYYMMDD` string into a calendar date.
///
/// # Errors
/// Returns [`DateError::Format`] for anything that is not a valid
/// zero-padded calendar date.
pub fn parse(input: &str) -> Result<Date, DateError> {
    Date::parse(input, DATE_FORMAT).map_err(|_| DateError::Format(input.to_owned()))
}

/// Render a calendar date as its 8-digit `YYYYMMDD` encoding.
#[must_use]
pub fn format(date: Date) -> String {
    let mut out = String::with_capacity(8);
    // Infallible: writing into a String cannot fail.
    let _ = write!(
        out,
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    );
    out
}
