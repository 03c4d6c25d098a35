//! Validation of task fields submitted by clients.

use crate::date::{self, DateError};
use thiserror::Error;
use time::Date;

/// Literal accepted in place of a concrete date.
const TODAY: &str = "today";

/// Errors raised while validating task fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The task title is required.
    #[error("task title must not be empty")]
    EmptyTitle,
    /// The submitted date string is not a calendar date.
    #[error(transparent)]
    Date(#[from] DateError),
}

/// Require a non-empty title.
///
/// # Errors
/// Returns [`FieldError::EmptyTitle`] when the title is empty.
pub const fn title(title: &str) -> Result<(), FieldError> {
    if title.is_empty() {
        return Err(FieldError::EmptyTitle);
    }
    Ok(())
}

/// Resolve a submitted date string against today's calendar date.
///
/// Empty input and the literal `today` resolve to `now`; past dates are
/// clamped to `now`; everything else must parse as `YYYYMMDD` and passes
/// through unchanged.
///
/// # Errors
/// Returns [`FieldError::Date`] when the input cannot be parsed.
pub fn resolve_date(raw: &str, now: Date) -> Result<Date, FieldError> {
    if raw.is_empty() || raw == TODAY {
        return Ok(now);
    }
    let parsed = date::parse(raw)?;
    if parsed < now {
        return Ok(now);
    }
    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use time::macros::date;

    const NOW: Date = date!(2024 - 01 - 10);

    #[test]
    fn title_must_not_be_empty() {
        assert_eq!(title(""), Err(FieldError::EmptyTitle));
        assert_eq!(title("water the plants"), Ok(()));
    }

    #[test]
    fn empty_and_literal_today_resolve_to_now() {
        assert_eq!(resolve_date("", NOW).expect("resolved"), NOW);
        assert_eq!(resolve_date("today", NOW).expect("resolved"), NOW);
    }

    #[test]
    fn past_dates_clamp_to_now() {
        assert_eq!(resolve_date("20231225", NOW).expect("resolved"), NOW);
    }

    #[test]
    fn today_and_future_dates_pass_through() {
        assert_eq!(resolve_date("20240110", NOW).expect("resolved"), NOW);
        assert_eq!(
            resolve_date("20240215", NOW).expect("resolved"),
            date!(2024 - 02 - 15)
        );
    }

    #[test]
    fn unparseable_dates_are_rejected() {
        assert!(matches!(
            resolve_date("not-a-date", NOW),
            Err(FieldError::Date(DateError::Format(_)))
        ));
    }
}
