//! Resolve contact events to their next concrete occurrence.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::years::format_year_count;

/// A contact event bound to its next occurrence, with display strings.
///
/// Derived on every resolution pass; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEvent {
    pub contact_id: String,
    pub contact_name: String,
    pub label: String,
    pub event_date: NaiveDate,
    /// Years since the anchor year, when the stored date carried one.
    pub years_elapsed: Option<i32>,
    /// "DD.MM ДН", e.g. "15.06 ВС"
    pub short_date_str: String,
    pub event_description: String,
}

/// Resolve every event of every contact relative to `today`.
///
/// One entry per (contact, label) pair, in contact order then label order.
/// Entries whose stored date does not parse are skipped and logged.
pub fn resolve_events(contacts: &[Contact], today: NaiveDate) -> Vec<ResolvedEvent> {
    let mut resolved = Vec::new();

    for contact in contacts {
        let contact_name = contact.name.display_name();

        for event in &contact.events {
            let date = match event.parsed_date() {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!(contact = %contact.id, label = %event.label, "skipping event: {e}");
                    continue;
                }
            };

            let Some(event_date) = date.next_occurrence(today) else {
                tracing::warn!(contact = %contact.id, label = %event.label, "event date out of range");
                continue;
            };

            let years_elapsed = date.year.map(|y| event_date.year() - y);

            resolved.push(ResolvedEvent {
                contact_id: contact.id.clone(),
                contact_name: contact_name.clone(),
                label: event.label.clone(),
                event_date,
                years_elapsed,
                short_date_str: short_date_label(event_date),
                event_description: describe(&event.label, years_elapsed),
            });
        }
    }

    resolved
}

fn describe(label: &str, years_elapsed: Option<i32>) -> String {
    match years_elapsed {
        Some(n) if n > 0 => format!("{} ({})", label, format_year_count(n as u32)),
        _ => label.to_string(),
    }
}

/// "DD.MM" followed by the uppercased Russian weekday abbreviation.
pub fn short_date_label(date: NaiveDate) -> String {
    format!(
        "{:02}.{:02} {}",
        date.day(),
        date.month(),
        weekday_abbrev(date.weekday())
    )
}

pub fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "ПН",
        Weekday::Tue => "ВТ",
        Weekday::Wed => "СР",
        Weekday::Thu => "ЧТ",
        Weekday::Fri => "ПТ",
        Weekday::Sat => "СБ",
        Weekday::Sun => "ВС",
    }
}
