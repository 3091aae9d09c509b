//! Aggregation periods and date-range resolution.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Utc};

use super::models::DATE_FORMAT;

/// Message returned for any unrecognised period keyword
pub const INVALID_PERIOD_MESSAGE: &str = "Invalid period. Use 'week', 'month' or 'lifetime'";

/// Source of "today" for period boundaries
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a single day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Inclusive date bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Named aggregation window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Sunday of the current week through today
    Week,
    /// First of the current month through today
    Month,
    /// Every record
    Lifetime,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Lifetime => "lifetime",
        }
    }

    /// Resolve the period to concrete bounds relative to `today`
    pub fn range(&self, today: NaiveDate) -> DateRange {
        match self {
            Period::Week => {
                let since_sunday = today.weekday().num_days_from_sunday();
                let start = today - Days::new(u64::from(since_sunday));
                DateRange::between(start, today)
            }
            Period::Month => DateRange::between(today.with_day(1).unwrap_or(today), today),
            Period::Lifetime => DateRange::unbounded(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognised period keywords
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", INVALID_PERIOD_MESSAGE)]
pub struct InvalidPeriod;

impl FromStr for Period {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "lifetime" => Ok(Period::Lifetime),
            _ => Err(InvalidPeriod),
        }
    }
}

/// Whether a path segment has the `NNNN-NN-NN` shape of a calendar date.
///
/// Shape only: `2023-13-40` qualifies and then fails [`parse_date`].
pub fn looks_like_date(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a strict `YYYY-MM-DD` calendar date
pub fn parse_date(segment: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(segment, DATE_FORMAT)
}
