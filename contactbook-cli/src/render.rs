//! Terminal rendering for contactbook types.
//!
//! Extension traits that add colored output to contactbook-core types using owo_colors.

use chrono::NaiveDate;
use contactbook_core::ResolvedEvent;
use contactbook_core::calendar::{
    CalendarDay, CalendarEntry, MONTH_NAMES, first_weekday_column, is_near, month_days,
    weekday_header,
};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for ResolvedEvent {
    fn render(&self) -> String {
        format!("{}, {}", self.contact_name, self.event_description)
    }
}

impl Render for CalendarEntry {
    fn render(&self) -> String {
        format!("{} {}", self.contact_name, self.description.dimmed())
    }
}

const CELL: usize = 3;

/// One month as a Monday-first grid followed by its events.
///
/// Days with events are green, or red when they fall within `window` days of `today`.
pub fn render_month(
    days: &[CalendarDay],
    year: i32,
    month: u32,
    today: NaiveDate,
    window: u32,
) -> String {
    let mut lines = Vec::new();

    let name = MONTH_NAMES[(month - 1) as usize];
    lines.push(format!("{} {}", name.bold(), year.to_string().dimmed()));
    lines.push(
        weekday_header()
            .iter()
            .map(|d| format!("{:>2}", d))
            .collect::<Vec<_>>()
            .join(" ")
            .dimmed()
            .to_string(),
    );

    let offset = first_weekday_column(year, month).unwrap_or(1) as usize - 1;
    let mut row = " ".repeat(offset * CELL);
    let mut column = offset;

    for day in month_days(days, month) {
        row.push_str(&render_cell(day, today, window));
        column += 1;
        if column == 7 {
            lines.push(row.trim_end().to_string());
            row = String::new();
            column = 0;
        } else {
            row.push(' ');
        }
    }
    if !row.trim().is_empty() {
        lines.push(row.trim_end().to_string());
    }

    for day in month_days(days, month).filter(|d| !d.events.is_empty()) {
        for entry in &day.events {
            lines.push(format!("  {} {}", day.date.format("%d.%m"), entry.render()));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn render_cell(day: &CalendarDay, today: NaiveDate, window: u32) -> String {
    let number = format!("{:>2}", day.date.format("%-d"));

    if day.events.is_empty() {
        if day.date == today {
            number.underline().to_string()
        } else {
            number
        }
    } else if is_near(day.date, today, window) {
        number.red().bold().to_string()
    } else {
        number.green().to_string()
    }
}
