use anyhow::Result;
use chrono::Datelike;
use contactbook_core::calendar::year_calendar;
use contactbook_core::clock::Clock;
use contactbook_core::store::ContactStore;

use super::Account;
use crate::render::render_month;

pub fn run(clock: &impl Clock, email: &str, year: Option<i32>) -> Result<()> {
    let account = Account::open(email)?;
    let today = clock.today();
    let year = year.unwrap_or(today.year());

    let contacts = account.store.list_contacts(&account.user.id)?;
    let days = year_calendar(&contacts, year);
    if days.is_empty() {
        anyhow::bail!("Year {} is out of range", year);
    }

    let window = account.config.reminders.window_days;
    for month in 1..=12 {
        println!("{}", render_month(&days, year, month, today, window));
    }

    Ok(())
}
