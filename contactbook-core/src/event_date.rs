//! The persisted `DD.MM` / `DD.MM.YYYY` event date format.
//!
//! This string format is stored verbatim in every contact and must stay stable.
//! Parsing is strict about zero-padding: `"9.1"` is rejected, `"09.01"` is not.
//! Month/day ordering elsewhere relies on that padding.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{ContactBookError, ContactBookResult};

/// A recurring event date: day and month, optionally anchored to a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventDate {
    pub day: u32,
    pub month: u32,
    pub year: Option<i32>,
}

impl EventDate {
    pub fn parse(s: &str) -> ContactBookResult<Self> {
        let invalid = || ContactBookError::InvalidEventDate(s.to_string());

        let segments: Vec<&str> = s.split('.').collect();
        let (day, month, year) = match segments.as_slice() {
            [d, m] => (*d, *m, None),
            [d, m, y] => (*d, *m, Some(*y)),
            _ => return Err(invalid()),
        };

        let day = parse_digits(day, 2).ok_or_else(invalid)?;
        let month = parse_digits(month, 2).ok_or_else(invalid)?;
        let year = match year {
            Some(y) => Some(parse_digits(y, 4).ok_or_else(invalid)? as i32),
            None => None,
        };

        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        match year {
            // With a year the full date has to exist (no 29.02.2023)
            Some(y) => {
                NaiveDate::from_ymd_opt(y, month, day).ok_or_else(invalid)?;
            }
            None => {
                if day == 0 || day > max_day_of_month(month) {
                    return Err(invalid());
                }
            }
        }

        Ok(EventDate { day, month, year })
    }

    /// `(month, day)`; ordering this tuple matches ordering zero-padded "MM.DD".
    pub fn month_day(&self) -> (u32, u32) {
        (self.month, self.day)
    }

    /// The date this event falls on in `year`.
    ///
    /// 29 February is clamped to 28 February in non-leap years.
    /// Returns `None` only when `year` is outside chrono's supported range.
    pub fn occurrence_in(&self, year: i32) -> Option<NaiveDate> {
        let day = if self.month == 2 && self.day == 29 && !is_leap_year(year) {
            28
        } else {
            self.day
        };
        NaiveDate::from_ymd_opt(year, self.month, day)
    }

    /// The next occurrence on or after `today`.
    pub fn next_occurrence(&self, today: NaiveDate) -> Option<NaiveDate> {
        let year = if (today.month(), today.day()) > self.month_day() {
            today.year() + 1
        } else {
            today.year()
        };
        self.occurrence_in(year)
    }
}

impl FromStr for EventDate {
    type Err = ContactBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventDate::parse(s)
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}.{:02}", self.day, self.month)?;
        if let Some(year) = self.year {
            write!(f, ".{:04}", year)?;
        }
        Ok(())
    }
}

/// Parse exactly `width` ASCII digits.
fn parse_digits(s: &str, width: usize) -> Option<u32> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Largest valid day for a month when no year is known (February allows 29).
fn max_day_of_month(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day_month() {
        let parsed = EventDate::parse("15.06").unwrap();
        assert_eq!(parsed, EventDate { day: 15, month: 6, year: None });
        assert_eq!(parsed.to_string(), "15.06");
    }

    #[test]
    fn test_parse_with_year() {
        let parsed = EventDate::parse("10.03.1990").unwrap();
        assert_eq!(parsed.year, Some(1990));
        assert_eq!(parsed.to_string(), "10.03.1990");
    }

    #[test]
    fn test_rejects_unpadded_segments() {
        for s in ["9.1", "09.1", "9.01", "10.03.90", "1.1.2000"] {
            assert!(EventDate::parse(s).is_err(), "{s} should be rejected");
        }
    }

    #[test]
    fn test_rejects_malformed_input() {
        for s in ["", "15", "15.06.1990.1", "aa.bb", "00.01", "32.01", "15.13", "31.04", "30.02", "29.02.2023", "+1.01"] {
            assert!(EventDate::parse(s).is_err(), "{s} should be rejected");
        }
    }

    #[test]
    fn test_accepts_leap_day_without_year() {
        assert!(EventDate::parse("29.02").is_ok());
        assert!(EventDate::parse("29.02.2000").is_ok());
    }

    #[test]
    fn test_leap_day_clamps_in_common_year() {
        let leap_day = EventDate::parse("29.02").unwrap();
        assert_eq!(leap_day.occurrence_in(2023), Some(date(2023, 2, 28)));
        assert_eq!(leap_day.occurrence_in(2024), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_next_occurrence_rolls_to_next_year_when_past() {
        let event = EventDate::parse("15.06").unwrap();
        assert_eq!(event.next_occurrence(date(2024, 6, 20)), Some(date(2025, 6, 15)));
        assert_eq!(event.next_occurrence(date(2024, 6, 15)), Some(date(2024, 6, 15)));
    }

    #[test]
    fn test_month_day_ordering_matches_padded_strings() {
        let a = EventDate::parse("09.01").unwrap();
        let b = EventDate::parse("10.01").unwrap();
        let c = EventDate::parse("01.02").unwrap();
        assert!(a.month_day() < b.month_day());
        assert!(b.month_day() < c.month_day());
        assert!("01.09" < "01.10" && "01.10" < "02.01");
    }
}
