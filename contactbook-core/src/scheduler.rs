//! Periodic reminder checks over an in-memory list of resolved events.
//!
//! The scheduler owns a snapshot of resolved events that callers replace
//! wholesale with [`ReminderScheduler::reset_events`]. A background tokio task
//! checks once immediately on [`ReminderScheduler::start`] and then every
//! `check_interval`, folding everything inside the upcoming window into one
//! notification.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::error::ContactBookResult;
use crate::notification::{DEFAULT_TITLE, Notification, Notifier, digest};
use crate::resolve::ResolvedEvent;
use crate::upcoming::{UPCOMING_WINDOW_DAYS, filter_upcoming};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub check_interval: Duration,
    pub window_days: u32,
    pub title: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        ReminderSettings {
            check_interval: DEFAULT_CHECK_INTERVAL,
            window_days: UPCOMING_WINDOW_DAYS,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Result of one reminder check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    NothingDue,
    /// A combined notification covering this many events was delivered.
    Delivered(usize),
    Failed(String),
}

struct Inner<C, N> {
    clock: Arc<C>,
    notifier: Arc<N>,
    settings: ReminderSettings,
    events: RwLock<Vec<ResolvedEvent>>,
}

impl<C: Clock, N: Notifier> Inner<C, N> {
    fn snapshot(&self) -> Vec<ResolvedEvent> {
        self.events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn check(&self) -> CheckOutcome {
        let today = self.clock.today();
        let due = filter_upcoming(&self.snapshot(), today, self.settings.window_days);

        tracing::debug!(%today, due = due.len(), "checking reminders");

        let Some(notification) = digest(&due, &self.settings.title) else {
            return CheckOutcome::NothingDue;
        };

        match self.notifier.deliver(&notification).await {
            Ok(()) => {
                tracing::info!(events = due.len(), "reminder delivered");
                CheckOutcome::Delivered(due.len())
            }
            Err(e) => {
                tracing::warn!("reminder delivery failed: {e}");
                CheckOutcome::Failed(e.to_string())
            }
        }
    }
}

pub struct ReminderScheduler<C: Clock, N: Notifier> {
    inner: Arc<Inner<C, N>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clock, N: Notifier> ReminderScheduler<C, N> {
    pub fn new(clock: Arc<C>, notifier: Arc<N>, settings: ReminderSettings) -> Self {
        ReminderScheduler {
            inner: Arc::new(Inner {
                clock,
                notifier,
                settings,
                events: RwLock::new(Vec::new()),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &ReminderSettings {
        &self.inner.settings
    }

    /// Replace the whole event list. Events are kept sorted by date.
    pub fn reset_events(&self, mut events: Vec<ResolvedEvent>) {
        events.sort_by_key(|e| e.event_date);
        *self
            .inner
            .events
            .write()
            .unwrap_or_else(|e| e.into_inner()) = events;
    }

    pub fn events(&self) -> Vec<ResolvedEvent> {
        self.inner.snapshot()
    }

    /// Run one check right now, outside the periodic schedule.
    pub async fn check_now(&self) -> CheckOutcome {
        self.inner.check().await
    }

    /// Deliver a fixed test notification through the same notifier.
    pub async fn test_notification(&self) -> ContactBookResult<()> {
        self.inner.notifier.deliver(&Notification::test()).await
    }

    /// Start (or restart) periodic checking. Must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
        }

        let inner = Arc::clone(&self.inner);
        let period = inner.settings.check_interval.max(Duration::from_secs(1));

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately
                ticker.tick().await;
                inner.check().await;
            }
        }));

        tracing::info!(interval = ?period, "reminder checks started");
    }

    /// Stop periodic checking. Safe to call repeatedly.
    pub fn stop(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
            tracing::info!("reminder checks stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl<C: Clock, N: Notifier> Drop for ReminderScheduler<C, N> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ContactBookError;
    use crate::resolve::short_date_label;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            RecordingNotifier {
                fail: true,
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<Notification> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn deliver(&self, notification: &Notification) -> ContactBookResult<()> {
            if self.fail {
                return Err(ContactBookError::Delivery("permission denied".into()));
            }
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(contact_id: &str, on: NaiveDate) -> ResolvedEvent {
        ResolvedEvent {
            contact_id: contact_id.into(),
            contact_name: "Ivanova Anna".into(),
            label: "Birthday".into(),
            event_date: on,
            years_elapsed: None,
            short_date_str: short_date_label(on),
            event_description: "Birthday".into(),
        }
    }

    fn scheduler(
        today: NaiveDate,
        notifier: RecordingNotifier,
    ) -> (
        ReminderScheduler<ManualClock, RecordingNotifier>,
        Arc<ManualClock>,
        Arc<RecordingNotifier>,
    ) {
        let clock = Arc::new(ManualClock::at_date(today));
        let notifier = Arc::new(notifier);
        let settings = ReminderSettings {
            check_interval: Duration::from_secs(60),
            ..Default::default()
        };
        let scheduler = ReminderScheduler::new(clock.clone(), notifier.clone(), settings);
        (scheduler, clock, notifier)
    }

    #[tokio::test]
    async fn test_check_combines_due_events() {
        let (scheduler, _clock, notifier) =
            scheduler(date(2024, 1, 1), RecordingNotifier::default());
        scheduler.reset_events(vec![
            event("b", date(2024, 1, 10)),
            event("a", date(2024, 1, 5)),
            event("c", date(2024, 2, 1)),
        ]);

        assert_eq!(scheduler.check_now().await, CheckOutcome::Delivered(2));

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, DEFAULT_TITLE);
        assert_eq!(
            sent[0].body,
            "05.01 ПТ: Ivanova Anna, Birthday\n10.01 СР: Ivanova Anna, Birthday"
        );
    }

    #[tokio::test]
    async fn test_nothing_due_delivers_nothing() {
        let (scheduler, _clock, notifier) =
            scheduler(date(2024, 1, 1), RecordingNotifier::default());
        scheduler.reset_events(vec![event("a", date(2024, 3, 1))]);

        assert_eq!(scheduler.check_now().await, CheckOutcome::NothingDue);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_not_raised() {
        let (scheduler, _clock, _notifier) =
            scheduler(date(2024, 1, 1), RecordingNotifier::failing());
        scheduler.reset_events(vec![event("a", date(2024, 1, 2))]);

        assert!(matches!(scheduler.check_now().await, CheckOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_reset_replaces_events() {
        let (scheduler, _clock, _notifier) =
            scheduler(date(2024, 1, 1), RecordingNotifier::default());
        scheduler.reset_events(vec![event("a", date(2024, 1, 2)), event("b", date(2024, 1, 3))]);
        scheduler.reset_events(vec![event("c", date(2024, 1, 4))]);

        let events = scheduler.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].contact_id, "c");
    }

    #[tokio::test]
    async fn test_test_notification() {
        let (scheduler, _clock, notifier) =
            scheduler(date(2024, 1, 1), RecordingNotifier::default());
        scheduler.test_notification().await.unwrap();
        assert_eq!(notifier.sent()[0].title, "Тестовое уведомление");
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_checks_until_stopped() {
        let (scheduler, _clock, notifier) =
            scheduler(date(2024, 1, 1), RecordingNotifier::default());
        scheduler.reset_events(vec![event("a", date(2024, 1, 2))]);

        scheduler.start();
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(notifier.sent().len(), 1, "checks immediately on start");

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(notifier.sent().len(), 2);

        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_tick_uses_current_today() {
        let (scheduler, clock, notifier) =
            scheduler(date(2024, 1, 1), RecordingNotifier::default());
        scheduler.reset_events(vec![event("a", date(2024, 1, 20))]);

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(notifier.sent().is_empty());

        clock.advance(chrono::Duration::days(10));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(notifier.sent().len(), 1);

        scheduler.stop();
    }
}
