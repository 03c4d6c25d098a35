//! The repeat-rule mini-language and next-occurrence arithmetic.
//!
//! A rule string is empty (one-off task) or starts with a selector token:
//! `y` repeats yearly, `d <n>` every `n` days, `w <d1,d2,...>` on the given
//! weekdays (1 = Monday .. 7 = Sunday).

use crate::date::format;
use std::str::FromStr;
use thiserror::Error;
use time::{Date, Duration, Month};

/// Largest accepted interval for the `d <n>` rule, in days.
pub const MAX_DAY_INTERVAL: u16 = 400;

/// Extra loop iterations granted beyond the provable bound of the advance
/// loops, so a bookkeeping slip degrades into an error instead of a hang.
const CAP_SLACK: i64 = 2;

/// Errors raised while parsing or applying a repeat rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Rule syntax or selector token not understood.
    #[error("malformed repeat rule {0:?}")]
    Format(String),
    /// A numeric value (or a computed date) is outside the supported range.
    #[error("repeat value out of range: {0}")]
    Range(String),
}

/// Parsed repeat rule attached to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repeat {
    /// One-off task without recurrence.
    None,
    /// Advance by exactly one calendar year per cycle.
    Yearly,
    /// Advance by a fixed number of days per cycle, in `1..=400`.
    EveryDays(u16),
    /// Next calendar day whose weekday is in the set (1 = Monday .. 7 = Sunday).
    Weekly(Vec<u8>),
}

impl FromStr for Repeat {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::None);
        }

        // Split on single spaces: doubled separators produce empty tokens
        // and are rejected, same as unknown selectors.
        let tokens: Vec<&str> = s.split(' ').collect();
        match tokens.as_slice() {
            ["y"] => Ok(Self::Yearly),
            ["d", interval] => {
                let days = interval
                    .parse::<u16>()
                    .ok()
                    .filter(|n| (1..=MAX_DAY_INTERVAL).contains(n))
                    .ok_or_else(|| RuleError::Range((*interval).to_owned()))?;
                Ok(Self::EveryDays(days))
            }
            ["w", list] => {
                let mut days = Vec::new();
                for element in list.split(',') {
                    let day = element
                        .parse::<u8>()
                        .ok()
                        .filter(|d| (1..=7).contains(d))
                        .ok_or_else(|| RuleError::Range(element.to_owned()))?;
                    days.push(day);
                }
                Ok(Self::Weekly(days))
            }
            _ => Err(RuleError::Format(s.to_owned())),
        }
    }
}

impl Repeat {
    /// Whether the rule describes a recurring task.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Compute the next occurrence strictly after `now`, cycling from `anchor`.
    ///
    /// At least one cycle is always applied, so the result is never `anchor`
    /// itself — even when `anchor` already lies in the future.
    ///
    /// # Errors
    /// [`RuleError::Format`] for [`Repeat::None`] (one-off tasks have no next
    /// occurrence) and [`RuleError::Range`] when the arithmetic would leave
    /// the supported calendar range.
    pub fn next_occurrence(&self, now: Date, anchor: Date) -> Result<Date, RuleError> {
        match self {
            Self::None => Err(RuleError::Format(String::new())),
            Self::Yearly => next_yearly(now, anchor),
            Self::EveryDays(days) => next_every_days(now, anchor, *days),
            Self::Weekly(days) => next_weekly(now, anchor, days),
        }
    }
}

fn next_every_days(now: Date, anchor: Date, days: u16) -> Result<Date, RuleError> {
    let step = i64::from(days);
    let cap = (now - anchor).whole_days().div_euclid(step).max(0) + CAP_SLACK;

    let mut date = anchor;
    for _ in 0..cap {
        date = date
            .checked_add(Duration::days(step))
            .ok_or_else(|| RuleError::Range(format(date)))?;
        if date > now {
            return Ok(date);
        }
    }
    Err(RuleError::Range(format(date)))
}

fn next_yearly(now: Date, anchor: Date) -> Result<Date, RuleError> {
    let cap = i64::from(now.year() - anchor.year()).max(0) + CAP_SLACK;

    let mut date = anchor;
    for _ in 0..cap {
        date = add_one_year(date)?;
        if date > now {
            return Ok(date);
        }
    }
    Err(RuleError::Range(format(date)))
}

fn add_one_year(date: Date) -> Result<Date, RuleError> {
    let year = date.year() + 1;
    // 29 February rolls over to 1 March in non-leap years.
    date.replace_year(year)
        .or_else(|_| Date::from_calendar_date(year, Month::March, 1))
        .map_err(|_| RuleError::Range(year.to_string()))
}

fn next_weekly(now: Date, anchor: Date, days: &[u8]) -> Result<Date, RuleError> {
    // Candidates up to `now` can never satisfy the strictly-after cut, so
    // start scanning just past the later of the two dates.
    let start = if anchor > now { anchor } else { now };
    let mut date = start.next_day().ok_or_else(|| RuleError::Range(format(start)))?;

    // A non-empty weekday set always matches within one week.
    for _ in 0..7 {
        if days.contains(&date.weekday().number_from_monday()) {
            return Ok(date);
        }
        date = date.next_day().ok_or_else(|| RuleError::Range(format(date)))?;
    }
    Err(RuleError::Format(format!("w {days:?}")))
}
