//! Reminder notifications and the delivery seam.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::ContactBookResult;
use crate::resolve::ResolvedEvent;

pub const DEFAULT_TITLE: &str = "Напоминание";
pub const EVENTS_LINK: &str = "/events";
pub const TEST_TITLE: &str = "Тестовое уведомление";
pub const TEST_BODY: &str = "Это тестовое уведомление для проверки работы системы";

/// A single reminder ready to hand to a delivery mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// App-relative URL the reminder should open.
    pub link: String,
}

impl Notification {
    pub fn test() -> Self {
        Notification {
            title: TEST_TITLE.to_string(),
            body: TEST_BODY.to_string(),
            link: EVENTS_LINK.to_string(),
        }
    }
}

/// Anything that can present a reminder to the user: desktop popups, e-mail, push.
///
/// Failures are reported to the caller but reminders are best-effort;
/// callers log them and carry on.
pub trait Notifier: Send + Sync + 'static {
    fn deliver(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = ContactBookResult<()>> + Send;
}

/// One line per event: "15.06 СБ: Ivanova Anna, Birthday (34 года)".
pub fn digest_line(event: &ResolvedEvent) -> String {
    format!(
        "{}: {}, {}",
        event.short_date_str, event.contact_name, event.event_description
    )
}

/// Fold events into one combined notification. `None` when there is nothing to say.
pub fn digest(events: &[ResolvedEvent], title: &str) -> Option<Notification> {
    let first = events.first()?;

    let body = events
        .iter()
        .map(digest_line)
        .collect::<Vec<_>>()
        .join("\n");

    let single_contact = events.iter().all(|e| e.contact_id == first.contact_id);
    let link = if single_contact {
        format!("/contacts/{}", first.contact_id)
    } else {
        EVENTS_LINK.to_string()
    };

    Some(Notification {
        title: title.to_string(),
        body,
        link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::short_date_label;
    use chrono::NaiveDate;

    fn event(contact_id: &str, name: &str, description: &str, day: u32) -> ResolvedEvent {
        let on = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        ResolvedEvent {
            contact_id: contact_id.into(),
            contact_name: name.into(),
            label: description.into(),
            event_date: on,
            years_elapsed: None,
            short_date_str: short_date_label(on),
            event_description: description.into(),
        }
    }

    #[test]
    fn test_digest_joins_lines() {
        let events = vec![
            event("a", "Ivanova Anna", "Birthday (34 года)", 15),
            event("b", "Petrov Boris", "Wedding", 16),
        ];
        let n = digest(&events, DEFAULT_TITLE).unwrap();
        assert_eq!(n.title, "Напоминание");
        assert_eq!(
            n.body,
            "15.06 СБ: Ivanova Anna, Birthday (34 года)\n16.06 ВС: Petrov Boris, Wedding"
        );
        assert_eq!(n.link, "/events");
    }

    #[test]
    fn test_digest_links_to_single_contact() {
        let events = vec![
            event("a", "Ivanova Anna", "Birthday", 15),
            event("a", "Ivanova Anna", "Name day", 18),
        ];
        assert_eq!(digest(&events, "t").unwrap().link, "/contacts/a");
    }

    #[test]
    fn test_digest_of_nothing() {
        assert!(digest(&[], DEFAULT_TITLE).is_none());
    }
}
