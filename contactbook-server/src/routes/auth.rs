//! Registration, login and session endpoints

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{FromRequestParts, OptionalFromRequestParts, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use contactbook_core::ContactBookError;
use contactbook_core::auth::{SESSION_COOKIE, SessionClaims, hash_password, verify_password};
use contactbook_core::store::UserStore;
use contactbook_core::user::{User, UserInfo};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/auth", get(check))
}

/// The signed-in user, taken from the `token` cookie or a Bearer header.
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(AppError::unauthorized)?;
        let claims = state.signer.verify(&token, Utc::now())?;
        Ok(AuthUser(claims))
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(session_token(&parts.headers)
            .and_then(|token| state.signer.verify(&token, Utc::now()).ok())
            .map(AuthUser))
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn session_cookie(state: &AppState, token: &str, max_age: i64) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if state.config.secure_cookies {
        cookie.push_str("; Secure");
    }
    Ok(HeaderValue::from_str(&cookie)?)
}

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    fn required(self) -> Result<(String, String), AppError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(AppError::bad_request("Email and password are required")),
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub user: UserInfo,
}

fn signed_in(
    state: &AppState,
    status: StatusCode,
    user: &User,
    message: &str,
) -> Result<Response, AppError> {
    let token = state.signer.issue(user, Utc::now())?;
    let cookie = session_cookie(state, &token, state.signer.ttl().num_seconds())?;

    let body = Json(SessionResponse {
        message: message.to_string(),
        user: UserInfo::from(user),
    });
    Ok((status, [(header::SET_COOKIE, cookie)], body).into_response())
}

/// POST /api/register - Create an account and sign in
async fn register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Response, AppError> {
    let (email, password) = req.required()?;
    if !email.contains('@') {
        return Err(AppError::bad_request("Invalid email address"));
    }

    let hash = hash_password(&password)?;
    let user = state.store.create_user(&email, hash)?;

    signed_in(&state, StatusCode::CREATED, &user, "Registered")
}

/// POST /api/login - Check credentials and set the session cookie
async fn login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Response, AppError> {
    let (email, password) = req.required()?;

    let user = state
        .store
        .find_user_by_email(&email)?
        .filter(|user| verify_password(&password, &user.password_hash))
        .ok_or(ContactBookError::InvalidCredentials)?;

    tracing::info!(user = %user.id, "signed in");
    signed_in(&state, StatusCode::OK, &user, "Logged in")
}

/// POST /api/logout - Clear the session cookie
async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    let cookie = session_cookie(&state, "", 0)?;
    let body = super::MessageResponse::new("Logged out");
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

#[derive(Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub user: Option<UserInfo>,
}

/// GET /api/auth - Report whether the request carries a valid session
async fn check(user: Option<AuthUser>) -> Json<AuthStatus> {
    Json(AuthStatus {
        authenticated: user.is_some(),
        user: user.map(|AuthUser(claims)| claims.user()),
    })
}
