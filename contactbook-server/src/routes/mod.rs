pub mod auth;
pub mod calendar;
pub mod contacts;
pub mod cron;
pub mod events;
pub mod notifications;

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use contactbook_core::ContactBookError;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error that already knows its status code.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Convert anyhow errors to HTTP responses
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self(
            HttpError {
                status,
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<HttpError>() {
            return err.status;
        }
        match self.0.downcast_ref::<ContactBookError>() {
            Some(err) => status_for(err),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn status_for(err: &ContactBookError) -> StatusCode {
    match err {
        ContactBookError::InvalidEventDate(_)
        | ContactBookError::DuplicateEventLabel(_)
        | ContactBookError::InvalidContact(_) => StatusCode::BAD_REQUEST,
        ContactBookError::ContactNotFound(_) | ContactBookError::UserNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ContactBookError::UserExists(_) => StatusCode::CONFLICT,
        ContactBookError::InvalidCredentials | ContactBookError::InvalidToken => {
            StatusCode::UNAUTHORIZED
        }
        ContactBookError::Delivery(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {:#}", self.0);
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// `{ "message": "..." }` replies.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(MessageResponse {
            message: message.into(),
        })
    }
}
