//! Date ranges, holidays and working-day arithmetic.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use leavedesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Longest calendar span a single leave request may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a validated range where `end` is on or after `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if end < start {
            return Err(AppError::Validation(format!(
                "end date {end} must not be before start date {start}"
            )));
        }

        let range = Self { start, end };
        if range.calendar_days() > MAX_RANGE_DAYS {
            return Err(AppError::Validation(format!(
                "a leave request may span at most {MAX_RANGE_DAYS} calendar days"
            )));
        }

        Ok(range)
    }

    /// Returns the first day of the range.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the range.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns the number of calendar days in the range, both ends included.
    #[must_use]
    pub fn calendar_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Returns whether the two ranges share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns whether the date falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates every calendar day of the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|day| *day <= self.end)
    }
}

/// Public holiday excluded from working-day counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    date: NaiveDate,
    name: NonEmptyString,
}

impl Holiday {
    /// Creates a named holiday.
    pub fn new(date: NaiveDate, name: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            date,
            name: NonEmptyString::with_max_chars("holiday name", name, 120)?,
        })
    }

    /// Returns the holiday date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the holiday name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }
}

/// Calendar deciding which days count as working days.
///
/// Saturdays and Sundays are never working days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl WorkingCalendar {
    /// Creates a calendar from holiday dates.
    #[must_use]
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Returns whether the date is a working day.
    #[must_use]
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// Counts working days inside the range.
    #[must_use]
    pub fn working_days(&self, range: &DateRange) -> u16 {
        let count = range.days().filter(|day| self.is_working_day(*day)).count();
        // bounded by MAX_RANGE_DAYS
        u16::try_from(count).unwrap_or(u16::MAX)
    }
}
