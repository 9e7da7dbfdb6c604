//! Resolved event endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use contactbook_core::store::ContactStore;
use contactbook_core::{ResolvedEvent, filter_upcoming, resolve_events};

use crate::routes::AppError;
use crate::routes::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events/upcoming", get(upcoming_events))
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub today: chrono::NaiveDate,
    pub events: Vec<ResolvedEvent>,
}

/// GET /api/events - Every contact event at its next occurrence, by date
async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<EventsResponse>, AppError> {
    let today = state.today();
    let contacts = state.store.list_contacts(user.id())?;

    let mut events = resolve_events(&contacts, today);
    events.sort_by_key(|e| e.event_date);

    Ok(Json(EventsResponse { today, events }))
}

#[derive(Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<u32>,
}

/// GET /api/events/upcoming?days=N - Events inside the lookahead window
async fn upcoming_events(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<EventsResponse>, AppError> {
    let today = state.today();
    let days = query.days.unwrap_or(state.config.reminders.window_days);
    let contacts = state.store.list_contacts(user.id())?;

    let events = filter_upcoming(&resolve_events(&contacts, today), today, days);

    Ok(Json(EventsResponse { today, events }))
}
