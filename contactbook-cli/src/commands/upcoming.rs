use anyhow::Result;
use chrono::NaiveDate;
use contactbook_core::clock::Clock;
use contactbook_core::store::{ContactStore, FileStore};
use contactbook_core::{ResolvedEvent, filter_upcoming, resolve_events};
use owo_colors::OwoColorize;

use super::Account;
use crate::render::Render;

pub fn run(clock: &impl Clock, email: &str, days: Option<u32>) -> Result<()> {
    let account = Account::open(email)?;
    let days = days.unwrap_or(account.config.reminders.window_days);
    let today = clock.today();

    let events = upcoming_events(&account.store, &account.user.id, today, days)?;

    if events.is_empty() {
        println!("{}", format!("No events in the next {} days", days).dimmed());
        return Ok(());
    }

    print!("{}", render_grouped(&events, today));
    Ok(())
}

fn upcoming_events(
    store: &FileStore,
    user_id: &str,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<ResolvedEvent>> {
    let contacts = store.list_contacts(user_id)?;
    Ok(filter_upcoming(&resolve_events(&contacts, today), today, days))
}

/// Events grouped under a day heading ("Today", "Tomorrow", or the short date).
fn render_grouped(events: &[ResolvedEvent], today: NaiveDate) -> String {
    let mut out = String::new();
    let mut current: Option<NaiveDate> = None;

    for event in events {
        if current != Some(event.event_date) {
            if current.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{}\n", day_label(event, today).bold()));
            current = Some(event.event_date);
        }

        let line = event.render();
        if event.event_date == today {
            out.push_str(&format!("  {}\n", line.red()));
        } else {
            out.push_str(&format!("  {}\n", line));
        }
    }

    out
}

fn day_label(event: &ResolvedEvent, today: NaiveDate) -> String {
    match (event.event_date - today).num_days() {
        0 => format!("Today, {}", event.short_date_str),
        1 => format!("Tomorrow, {}", event.short_date_str),
        _ => event.short_date_str.clone(),
    }
}
