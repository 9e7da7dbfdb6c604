//! E-mail digests through a Resend-compatible HTTP API.

use chrono::NaiveDate;
use serde::Serialize;

use contactbook_core::config::MailConfig;
use contactbook_core::{ContactBookError, ContactBookResult, ResolvedEvent};

pub const DIGEST_HEADING: &str = "Предстоящие события";

#[derive(Serialize)]
struct SendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Sends to one fixed recipient.
pub struct Mailer {
    http: reqwest::Client,
    config: MailConfig,
    to: String,
}

impl Mailer {
    pub fn new(http: reqwest::Client, config: MailConfig, to: impl Into<String>) -> Self {
        Mailer {
            http,
            config,
            to: to.into(),
        }
    }

    pub async fn send(&self, subject: &str, html: &str) -> ContactBookResult<()> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ContactBookError::Config("mail.api_key is not set".into()))?;

        let resp = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&SendEmail {
                from: &self.config.from,
                to: [self.to.as_str()],
                subject,
                html,
            })
            .send()
            .await
            .map_err(|e| ContactBookError::Delivery(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ContactBookError::Delivery(format!(
                "mail API returned {}: {}",
                status, body
            )));
        }

        tracing::info!(to = %self.to, subject, "e-mail sent");
        Ok(())
    }
}

/// Subject line for a digest of `count` events.
pub fn digest_subject(count: usize) -> String {
    format!("{} ({})", DIGEST_HEADING, count)
}

/// HTML list of upcoming events. Events falling on `today` are shown in red.
pub fn digest_html(events: &[ResolvedEvent], today: NaiveDate) -> String {
    let items: String = events
        .iter()
        .map(|e| {
            let style = if e.event_date == today {
                " style=\"color: red\""
            } else {
                ""
            };
            format!(
                "<li{}><strong>{}</strong>: {}, {}</li>",
                style,
                escape_html(&e.short_date_str),
                escape_html(&e.contact_name),
                escape_html(&e.event_description)
            )
        })
        .collect();

    page(DIGEST_HEADING, &items)
}

fn page(heading: &str, items: &str) -> String {
    format!(
        "<html><body><h2>{}</h2><ul>{}</ul></body></html>",
        heading, items
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, on: NaiveDate) -> ResolvedEvent {
        ResolvedEvent {
            contact_id: "c1".into(),
            contact_name: name.into(),
            label: "Birthday".into(),
            event_date: on,
            years_elapsed: None,
            short_date_str: "15.06 СБ".into(),
            event_description: "Birthday".into(),
        }
    }

    #[test]
    fn test_digest_html_marks_today_and_escapes() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let html = digest_html(&[event("Tom & Jerry", today), event("Ann", tomorrow)], today);

        assert!(html.contains("<li style=\"color: red\"><strong>15.06 СБ</strong>: Tom &amp; Jerry, Birthday</li>"));
        assert!(html.contains("<li><strong>15.06 СБ</strong>: Ann, Birthday</li>"));
        assert!(html.contains(DIGEST_HEADING));
    }

    #[test]
    fn test_digest_subject() {
        assert_eq!(digest_subject(3), "Предстоящие события (3)");
    }

    #[tokio::test]
    async fn test_send_without_api_key_is_config_error() {
        let mailer = Mailer::new(reqwest::Client::new(), MailConfig::default(), "a@b.c");
        let err = mailer.send("s", "<p/>").await.unwrap_err();
        assert!(matches!(err, ContactBookError::Config(_)));
    }
}
