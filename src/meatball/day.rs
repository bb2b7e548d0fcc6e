//! Meatball Day dates.
//!
//! A [`MeatballDay`] is a month and a day, without a year. Validation mirrors
//! what members can type: the month must be in 1-12 and the day in 1-31 for
//! every month. Combinations that never exist on a calendar (February 30th)
//! are accepted and simply never match.

use std::{fmt, num::IntErrorKind};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::MemberId;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Errors raised when a month or a day typed by a member is invalid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is not a number")]
    NotNumeric(String),
    #[error("{value} is out of range {start}-{stop}")]
    OutOfRange {
        value: String,
        start: i64,
        stop: i64,
    },
}

/// A yearless date a member celebrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMeatballDay")]
pub struct MeatballDay {
    month: u32,
    day: u32,
}

/// Unvalidated form used when reading the store from disk.
#[derive(Deserialize)]
struct RawMeatballDay {
    month: i64,
    day: i64,
}

impl TryFrom<RawMeatballDay> for MeatballDay {
    type Error = ValidationError;

    fn try_from(raw: RawMeatballDay) -> Result<Self, Self::Error> {
        Ok(MeatballDay {
            month: check_range(raw.month, 1, 12)?,
            day: check_range(raw.day, 1, 31)?,
        })
    }
}

fn check_range(value: i64, start: i64, stop: i64) -> Result<u32, ValidationError> {
    if !(start..=stop).contains(&value) {
        return Err(ValidationError::OutOfRange {
            value: value.to_string(),
            start,
            stop,
        });
    }
    // The range check above keeps the value well inside u32
    Ok(value as u32)
}

fn parse_in_range(value: &str, start: i64, stop: i64) -> Result<u32, ValidationError> {
    let trimmed = value.trim();
    match trimmed.parse::<i64>() {
        Ok(number) => check_range(number, start, stop),
        // Still a number, just too large for any range
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(ValidationError::OutOfRange {
                value: trimmed.to_owned(),
                start,
                stop,
            })
        }
        Err(_) => Err(ValidationError::NotNumeric(value.to_owned())),
    }
}

/// Parses a month typed by a member.
pub fn parse_month(value: &str) -> Result<u32, ValidationError> {
    parse_in_range(value, 1, 12)
}

/// Parses a day typed by a member.
pub fn parse_day(value: &str) -> Result<u32, ValidationError> {
    parse_in_range(value, 1, 31)
}

impl MeatballDay {
    #[cfg(test)]
    pub fn new(month: u32, day: u32) -> Result<Self, ValidationError> {
        MeatballDay::try_from(RawMeatballDay {
            month: month.into(),
            day: day.into(),
        })
    }

    /// Parses the month and day arguments of a command.
    ///
    /// The month is validated first, so a command with two bad arguments
    /// reports the month.
    pub fn parse(month: &str, day: &str) -> Result<Self, ValidationError> {
        Ok(MeatballDay {
            month: parse_month(month)?,
            day: parse_day(day)?,
        })
    }

    /// Whether `date` falls on this Meatball Day, ignoring the year.
    pub fn is_on(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }

    /// The first occurrence strictly after `today`, looking at this year and
    /// the next one.
    ///
    /// Returns `None` when the date does not exist in either year, which is
    /// always the case for impossible dates and sometimes for February 29th.
    pub fn next_after(&self, today: NaiveDate) -> Option<NaiveDate> {
        [today.year(), today.year() + 1]
            .into_iter()
            .filter_map(|year| NaiveDate::from_ymd_opt(year, self.month, self.day))
            .find(|date| *date > today)
    }
}

impl fmt::Display for MeatballDay {
    /// Formats as `July 4th`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}",
            MONTH_NAMES[(self.month - 1) as usize],
            to_ordinal(self.day)
        )
    }
}

/// Formats a day of the month as an English ordinal (`1st`, `12th`, `23rd`).
pub fn to_ordinal(n: u32) -> String {
    if (11..=13).contains(&(n % 100)) {
        return format!("{}th", n);
    }

    let suffix = match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Finds whose Meatball Day comes next after `today`.
///
/// Ties on the same date go to the lowest member id so the answer is stable.
pub fn next_meatball_day(
    days: impl IntoIterator<Item = (MemberId, MeatballDay)>,
    today: NaiveDate,
) -> Option<(MemberId, NaiveDate)> {
    days.into_iter()
        .filter_map(|(member, day)| day.next_after(today).map(|date| (member, date)))
        .min_by_key(|(member, date)| (*date, *member))
}
