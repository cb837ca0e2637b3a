// crates/quick-surveys-core/src/core/time.rs
// ============================================================================
// Module: Quick Surveys Time Model
// Description: Calendar dates and inclusive date ranges for audience targeting.
// Purpose: Parse `YYYY-MM-DD` bounds once and compare them against timestamps.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Audience bounds are authored as calendar dates. Instants are compared by
//! their UTC calendar day, so a lower bound starts at midnight and an upper
//! bound runs to the end of its day. The engine never reads wall-clock time;
//! viewer timestamps are supplied by the host.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde::Serializer;
use time::Date;
use time::Month;
use time::OffsetDateTime;
use time::UtcOffset;

// ============================================================================
// SECTION: Calendar Date
// ============================================================================

/// Calendar date written as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(Date);

impl CalendarDate {
    /// Parses a strict `YYYY-MM-DD` value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split('-');
        let year = parts.next()?;
        let month = parts.next()?;
        let day = parts.next()?;
        if parts.next().is_some() || year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u8 = month.parse().ok()?;
        let day: u8 = day.parse().ok()?;
        let month = Month::try_from(month).ok()?;
        Date::from_calendar_date(year, month, day).ok().map(Self)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, month, day) = self.0.to_calendar_date();
        write!(f, "{year:04}-{:02}-{day:02}", u8::from(month))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// SECTION: Date Range
// ============================================================================

/// Inclusive date range with optional open ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Earliest admitted day; open when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<CalendarDate>,
    /// Latest admitted day; open when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<CalendarDate>,
}

impl DateRange {
    /// Returns true when `instant` falls inside the range.
    #[must_use]
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        let day = instant.to_offset(UtcOffset::UTC).date();
        self.from.is_none_or(|from| day >= from.0) && self.to.is_none_or(|to| day <= to.0)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
