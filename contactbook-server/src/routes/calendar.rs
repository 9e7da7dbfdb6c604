//! Year calendar endpoint

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use contactbook_core::calendar::{CalendarDay, year_calendar};
use contactbook_core::store::ContactStore;

use crate::routes::AppError;
use crate::routes::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/calendar/{year}", get(calendar))
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub today: chrono::NaiveDate,
    pub days: Vec<CalendarDay>,
}

/// GET /api/calendar/:year - Every day of the year with its contact events
async fn calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(year): Path<i32>,
) -> Result<Json<CalendarResponse>, AppError> {
    let contacts = state.store.list_contacts(user.id())?;
    let days = year_calendar(&contacts, year);
    if days.is_empty() {
        return Err(AppError::bad_request(format!("Year out of range: {}", year)));
    }

    Ok(Json(CalendarResponse {
        year,
        today: state.today(),
        days,
    }))
}
