//! Push subscription endpoints

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use contactbook_core::notification::{EVENTS_LINK, Notification, Notifier};

use crate::push::{PushRelay, PushSubscription};
use crate::routes::AppError;
use crate::routes::auth::AuthUser;
use crate::state::AppState;

const DEFAULT_PUSH_TITLE: &str = "Новое уведомление";
const DEFAULT_PUSH_BODY: &str = "У вас новое уведомление";

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/notifications",
        get(count).post(action).delete(unsubscribe),
    )
}

#[derive(Serialize)]
pub struct NotificationResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl NotificationResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(NotificationResponse {
            success: true,
            message: message.into(),
            count: None,
        })
    }
}

/// GET /api/notifications - Number of active subscribers
async fn count(State(state): State<AppState>) -> Json<NotificationResponse> {
    let count = state.subscriptions.count().await;
    Json(NotificationResponse {
        success: true,
        message: format!("Active subscribers: {}", count),
        count: Some(count),
    })
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum NotificationAction {
    Subscribe {
        subscription: Option<PushSubscription>,
    },
    Send {
        title: Option<String>,
        message: Option<String>,
        url: Option<String>,
    },
}

/// POST /api/notifications - `subscribe` stores a subscription, `send` pushes to all
async fn action(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<NotificationResponse>, AppError> {
    let action: NotificationAction = serde_json::from_value(body)
        .map_err(|e| AppError::bad_request(format!("Unknown action: {}", e)))?;

    if user.is_none() {
        return Err(AppError::unauthorized());
    }

    match action {
        NotificationAction::Subscribe { subscription } => {
            let subscription = subscription
                .ok_or_else(|| AppError::bad_request("Missing subscription data"))?;
            state.subscriptions.subscribe(subscription).await;
            Ok(NotificationResponse::ok("Subscription saved"))
        }
        NotificationAction::Send {
            title,
            message,
            url,
        } => {
            let notification = Notification {
                title: title.unwrap_or_else(|| DEFAULT_PUSH_TITLE.to_string()),
                body: message.unwrap_or_else(|| DEFAULT_PUSH_BODY.to_string()),
                link: url.unwrap_or_else(|| EVENTS_LINK.to_string()),
            };

            let relay = PushRelay::new(state.http.clone(), state.subscriptions.clone());
            relay.deliver(&notification).await?;

            Ok(NotificationResponse::ok(format!(
                "Notification sent to {} subscribers",
                state.subscriptions.count().await
            )))
        }
    }
}

#[derive(Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: Option<String>,
}

/// DELETE /api/notifications - Forget a subscription by endpoint
async fn unsubscribe(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<UnsubscribeRequest>,
) -> Result<Json<NotificationResponse>, AppError> {
    let endpoint = req
        .endpoint
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing endpoint"))?;

    state.subscriptions.remove(&endpoint).await;
    Ok(NotificationResponse::ok("Subscription removed"))
}
