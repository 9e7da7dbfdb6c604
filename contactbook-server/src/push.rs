//! Browser push subscriptions and the relay that fans reminders out to them.
//!
//! Subscriptions live in memory only. The relay POSTs the notification
//! payload as JSON to each subscription endpoint; endpoints that answer
//! `410 Gone` are forgotten.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinSet;

use contactbook_core::{ContactBookError, ContactBookResult};
use contactbook_core::notification::{Notification, Notifier};

const ICON: &str = "/icon-192x192.png";
const TAG: &str = "contacts-app-event";

/// A browser push subscription. Fields other than `endpoint` are kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Default)]
pub struct Subscriptions(Arc<RwLock<Vec<PushSubscription>>>);

impl Subscriptions {
    /// Add a subscription, replacing any existing one with the same endpoint.
    pub async fn subscribe(&self, subscription: PushSubscription) {
        let mut subs = self.0.write().await;
        match subs.iter_mut().find(|s| s.endpoint == subscription.endpoint) {
            Some(existing) => *existing = subscription,
            None => subs.push(subscription),
        }
    }

    /// Returns whether anything was removed.
    pub async fn remove(&self, endpoint: &str) -> bool {
        let mut subs = self.0.write().await;
        let before = subs.len();
        subs.retain(|s| s.endpoint != endpoint);
        subs.len() != before
    }

    pub async fn count(&self) -> usize {
        self.0.read().await.len()
    }

    async fn snapshot(&self) -> Vec<PushSubscription> {
        self.0.read().await.clone()
    }
}

/// Body POSTed to each endpoint, shaped like a service-worker `showNotification` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub options: PushOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub require_interaction: bool,
    pub data: PushData,
}

#[derive(Debug, Serialize)]
pub struct PushData {
    pub url: String,
}

impl From<&Notification> for PushPayload {
    fn from(n: &Notification) -> Self {
        PushPayload {
            title: n.title.clone(),
            options: PushOptions {
                body: n.body.clone(),
                icon: ICON.to_string(),
                badge: ICON.to_string(),
                tag: TAG.to_string(),
                require_interaction: false,
                data: PushData {
                    url: n.link.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
    pub removed: usize,
}

enum SendResult {
    Delivered,
    Gone(String),
    Failed,
}

pub struct PushRelay {
    http: reqwest::Client,
    subscriptions: Subscriptions,
}

impl PushRelay {
    pub fn new(http: reqwest::Client, subscriptions: Subscriptions) -> Self {
        PushRelay {
            http,
            subscriptions,
        }
    }

    /// Send to every subscriber concurrently. Failures are logged, not returned.
    pub async fn broadcast(&self, notification: &Notification) -> BroadcastReport {
        let payload = Arc::new(PushPayload::from(notification));
        let mut sends = JoinSet::new();

        for sub in self.subscriptions.snapshot().await {
            let http = self.http.clone();
            let payload = Arc::clone(&payload);
            sends.spawn(async move {
                match http.post(&sub.endpoint).json(&*payload).send().await {
                    Ok(resp) if resp.status() == StatusCode::GONE => SendResult::Gone(sub.endpoint),
                    Ok(resp) if resp.status().is_success() => SendResult::Delivered,
                    Ok(resp) => {
                        tracing::warn!(endpoint = %sub.endpoint, status = %resp.status(), "push rejected");
                        SendResult::Failed
                    }
                    Err(e) => {
                        tracing::warn!(endpoint = %sub.endpoint, "push failed: {e}");
                        SendResult::Failed
                    }
                }
            });
        }

        let mut report = BroadcastReport::default();
        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok(SendResult::Delivered) => report.delivered += 1,
                Ok(SendResult::Gone(endpoint)) => {
                    if self.subscriptions.remove(&endpoint).await {
                        tracing::info!(%endpoint, "dropped expired push subscription");
                        report.removed += 1;
                    }
                }
                Ok(SendResult::Failed) => report.failed += 1,
                Err(e) => {
                    tracing::error!("push task panicked: {e}");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

impl Notifier for PushRelay {
    async fn deliver(&self, notification: &Notification) -> ContactBookResult<()> {
        let report = self.broadcast(notification).await;
        tracing::debug!(?report, "push broadcast finished");

        if report.delivered == 0 && report.failed > 0 {
            return Err(ContactBookError::Delivery(format!(
                "push failed for all {} subscribers",
                report.failed
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(endpoint: &str) -> PushSubscription {
        serde_json::from_value(serde_json::json!({
            "endpoint": endpoint,
            "keys": { "p256dh": "k", "auth": "a" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_subscribe_replaces_same_endpoint() {
        let subs = Subscriptions::default();
        subs.subscribe(sub("https://push.example/1")).await;
        subs.subscribe(sub("https://push.example/1")).await;
        subs.subscribe(sub("https://push.example/2")).await;
        assert_eq!(subs.count().await, 2);

        assert!(subs.remove("https://push.example/1").await);
        assert!(!subs.remove("https://push.example/1").await);
        assert_eq!(subs.count().await, 1);
    }

    #[test]
    fn test_subscription_keeps_extra_fields() {
        let json = serde_json::to_value(sub("https://push.example/1")).unwrap();
        assert_eq!(json["keys"]["auth"], "a");
    }

    #[test]
    fn test_payload_shape() {
        let payload = PushPayload::from(&Notification::test());
        let json = serde_json::to_value(payload).unwrap();
        assert_eq!(json["options"]["data"]["url"], "/events");
        assert_eq!(json["options"]["requireInteraction"], false);
        assert_eq!(json["options"]["tag"], "contacts-app-event");
    }

    #[tokio::test]
    async fn test_deliver_with_no_subscribers() {
        let relay = PushRelay::new(reqwest::Client::new(), Subscriptions::default());
        assert_eq!(relay.broadcast(&Notification::test()).await, BroadcastReport::default());
        assert!(relay.deliver(&Notification::test()).await.is_ok());
    }

    #[tokio::test]
    async fn test_deliver_fails_when_every_send_fails() {
        let subs = Subscriptions::default();
        subs.subscribe(sub("http://127.0.0.1:1/unreachable")).await;
        let relay = PushRelay::new(reqwest::Client::new(), subs.clone());

        let err = relay.deliver(&Notification::test()).await.unwrap_err();
        assert!(matches!(err, ContactBookError::Delivery(_)));
        assert_eq!(subs.count().await, 1);
    }
}
