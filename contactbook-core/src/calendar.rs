//! Year calendar: every day of a year with the contact events falling on it.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::contact::Contact;
use crate::upcoming::window_end;

/// One day of the year view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub events: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub contact_id: String,
    pub contact_name: String,
    pub description: String,
}

/// Build all days of `year` (Jan 1 through Dec 31) and attach events by month and day.
///
/// Anchor years are ignored here: an event shows on its day in every year.
/// Returns an empty list if `year` is out of chrono's range.
pub fn year_calendar(contacts: &[Contact], year: i32) -> Vec<CalendarDay> {
    let (Some(start), Some(end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return Vec::new();
    };

    let mut days: Vec<CalendarDay> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| CalendarDay {
            date,
            events: Vec::new(),
        })
        .collect();

    let index: HashMap<NaiveDate, usize> =
        days.iter().enumerate().map(|(i, d)| (d.date, i)).collect();

    for contact in contacts {
        for event in &contact.events {
            let Ok(date) = event.parsed_date() else {
                continue;
            };
            let Some(on) = date.occurrence_in(year) else {
                continue;
            };
            if let Some(&i) = index.get(&on) {
                days[i].events.push(CalendarEntry {
                    contact_id: contact.id.clone(),
                    contact_name: contact.name.short_name(),
                    description: event.label.clone(),
                });
            }
        }
    }

    days
}

/// Days of one month (1-based) from a year view.
pub fn month_days(days: &[CalendarDay], month: u32) -> impl Iterator<Item = &CalendarDay> {
    days.iter().filter(move |d| d.date.month() == month)
}

/// Column of the first day of the month in a Monday-first grid (1 = Monday, 7 = Sunday).
pub fn first_weekday_column(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.weekday().number_from_monday())
}

pub const MONTH_NAMES: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

/// Monday-first weekday header.
pub fn weekday_header() -> [&'static str; 7] {
    let mut header = [""; 7];
    let mut day = Weekday::Mon;
    for slot in header.iter_mut() {
        *slot = short_weekday(day);
        day = day.succ();
    }
    header
}

fn short_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Пн",
        Weekday::Tue => "Вт",
        Weekday::Wed => "Ср",
        Weekday::Thu => "Чт",
        Weekday::Fri => "Пт",
        Weekday::Sat => "Сб",
        Weekday::Sun => "Вс",
    }
}

/// True if `date` is within `days` after `today` (inclusive); used to highlight near events.
pub fn is_near(date: NaiveDate, today: NaiveDate, days: u32) -> bool {
    date >= today && date <= window_end(today, days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{ContactEvents, ContactInput, ContactName};
    use chrono::Utc;

    fn contact(events: &[(&str, &str)]) -> Contact {
        let input = ContactInput {
            name: ContactName {
                first_name: "Anna".into(),
                last_name: "Ivanova".into(),
                ..Default::default()
            },
            events: ContactEvents::from_pairs(events.iter().copied()).unwrap(),
            ..Default::default()
        };
        Contact::from_input("user", input, Utc::now())
    }

    #[test]
    fn test_year_has_every_day() {
        assert_eq!(year_calendar(&[], 2023).len(), 365);
        assert_eq!(year_calendar(&[], 2024).len(), 366);
    }

    #[test]
    fn test_events_placed_on_month_day() {
        let contacts = vec![contact(&[("Birthday", "10.03.1990"), ("Именины", "25.12")])];
        let days = year_calendar(&contacts, 2024);

        let march_10 = days
            .iter()
            .find(|d| d.date == NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
            .unwrap();
        assert_eq!(march_10.events.len(), 1);
        assert_eq!(march_10.events[0].contact_name, "Anna Ivanova");
        assert_eq!(march_10.events[0].description, "Birthday");

        let total: usize = days.iter().map(|d| d.events.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_leap_day_event_shows_on_feb_28_in_common_year() {
        let contacts = vec![contact(&[("Birthday", "29.02")])];
        let days = year_calendar(&contacts, 2023);
        let feb_28 = days
            .iter()
            .find(|d| d.date == NaiveDate::from_ymd_opt(2023, 2, 28).unwrap())
            .unwrap();
        assert_eq!(feb_28.events.len(), 1);
    }

    #[test]
    fn test_month_helpers() {
        let days = year_calendar(&[], 2024);
        assert_eq!(month_days(&days, 2).count(), 29);
        // 1 January 2024 was a Monday
        assert_eq!(first_weekday_column(2024, 1), Some(1));
        assert_eq!(weekday_header()[6], "Вс");
    }

    #[test]
    fn test_is_near_with_huge_window() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(is_near(later, today, u32::MAX));
        assert!(!is_near(later, today, 14));
        assert!(!is_near(today.pred_opt().unwrap(), today, u32::MAX));
    }
}
