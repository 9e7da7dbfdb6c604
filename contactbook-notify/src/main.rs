//! Desktop reminders for one contactbook user.
//!
//! Loads the user's contacts, shows a desktop notification whenever events fall
//! inside the reminder window, and re-reads contacts on every check interval.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use contactbook_core::clock::{Clock, SystemClock};
use contactbook_core::config::AppConfig;
use contactbook_core::notification::{Notification, Notifier};
use contactbook_core::resolve_events;
use contactbook_core::scheduler::ReminderScheduler;
use contactbook_core::store::{ContactStore, FileStore, UserStore};
use contactbook_core::{ContactBookError, ContactBookResult};

const APP_NAME: &str = "contactbook";

#[derive(Parser, Debug)]
#[command(name = "contactbook-notify", version, about = "Desktop reminders for upcoming contact events")]
struct Args {
    /// E-mail of the account whose contacts to watch
    #[arg(long)]
    user: String,

    /// How often to check, e.g. "24h" or "30m" (defaults to reminders.check_interval)
    #[arg(long, value_parser = humantime::parse_duration)]
    interval: Option<Duration>,

    /// Show a test notification and exit
    #[arg(long)]
    test: bool,
}

/// Shows reminders through the desktop notification service.
struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    async fn deliver(&self, notification: &Notification) -> ContactBookResult<()> {
        let title = notification.title.clone();
        let body = notification.body.clone();

        tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname(APP_NAME)
                .summary(&title)
                .body(&body)
                .show()
                .map(|_| ())
                .map_err(|e| ContactBookError::Delivery(e.to_string()))
        })
        .await
        .map_err(|e| ContactBookError::Delivery(e.to_string()))?
    }
}

type Scheduler = ReminderScheduler<SystemClock, DesktopNotifier>;

fn reload(store: &FileStore, user_id: &str, scheduler: &Scheduler, clock: &SystemClock) -> Result<()> {
    let contacts = store.list_contacts(user_id)?;
    let events = resolve_events(&contacts, clock.today());
    tracing::debug!(contacts = contacts.len(), events = events.len(), "contacts reloaded");
    scheduler.reset_events(events);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = AppConfig::load()?;
    let mut settings = config.reminders.settings()?;
    if let Some(interval) = args.interval {
        settings.check_interval = interval;
    }

    let clock = Arc::new(SystemClock);
    let scheduler = ReminderScheduler::new(Arc::clone(&clock), Arc::new(DesktopNotifier), settings);

    if args.test {
        scheduler.test_notification().await?;
        return Ok(());
    }

    let store = FileStore::open(config.data_path())?;
    let user = store
        .find_user_by_email(&args.user)?
        .with_context(|| format!("No account registered for {}", args.user))?;

    reload(&store, &user.id, &scheduler, &clock)?;
    scheduler.start();
    tracing::info!(
        user = %user.email,
        interval = %humantime::format_duration(scheduler.settings().check_interval),
        "watching for upcoming events"
    );

    let period = scheduler.settings().check_interval.max(Duration::from_secs(1));
    let mut reload_timer = tokio::time::interval(period);
    reload_timer.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = reload_timer.tick() => {
                if let Err(e) = reload(&store, &user.id, &scheduler, &clock) {
                    tracing::warn!("could not reload contacts: {e:#}");
                }
            }
        }
    }

    scheduler.stop();
    tracing::info!("stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_interval() {
        let args = Args::try_parse_from(["contactbook-notify", "--user", "a@b.c", "--interval", "30m"])
            .unwrap();
        assert_eq!(args.interval, Some(Duration::from_secs(30 * 60)));
        assert!(!args.test);
    }

    #[test]
    fn test_user_is_required() {
        assert!(Args::try_parse_from(["contactbook-notify"]).is_err());
    }
}
