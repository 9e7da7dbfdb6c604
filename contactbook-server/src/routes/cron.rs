//! Endpoints meant to be hit by an external scheduler

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    routing::get,
};
use serde::Serialize;

use contactbook_core::store::{ContactStore, UserStore};
use contactbook_core::{filter_upcoming, resolve_events};

use crate::mailer::{Mailer, digest_html, digest_subject};
use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/cron/nearest-events", get(nearest_events))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(secret) = state.config.cron_secret.as_deref() else {
        return Err(AppError::unauthorized());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided == Some(secret) {
        Ok(())
    } else {
        Err(AppError::unauthorized())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronResponse {
    pub message: String,
    pub events_count: usize,
    pub emails_sent: usize,
}

/// GET /api/cron/nearest-events - E-mail every user a digest of their upcoming events
async fn nearest_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CronResponse>, AppError> {
    authorize(&state, &headers)?;

    let today = state.today();
    let window = state.config.reminders.window_days;

    let mut events_count = 0;
    let mut emails_sent = 0;

    for user in state.store.list_users()? {
        let contacts = match state.store.list_contacts(&user.id) {
            Ok(contacts) => contacts,
            Err(e) => {
                tracing::warn!(user = %user.id, "skipping digest, contacts unreadable: {e}");
                continue;
            }
        };
        let upcoming = filter_upcoming(&resolve_events(&contacts, today), today, window);
        if upcoming.is_empty() {
            continue;
        }
        events_count += upcoming.len();

        let mailer = Mailer::new(state.http.clone(), state.config.mail.clone(), &user.email);
        match mailer
            .send(&digest_subject(upcoming.len()), &digest_html(&upcoming, today))
            .await
        {
            Ok(()) => emails_sent += 1,
            Err(e) => tracing::warn!(user = %user.id, "digest not sent: {e}"),
        }
    }

    let message = if events_count == 0 {
        format!("No upcoming events in the next {} days", window)
    } else {
        format!("Sent {} digest e-mails", emails_sent)
    };

    Ok(Json(CronResponse {
        message,
        events_count,
        emails_sent,
    }))
}
