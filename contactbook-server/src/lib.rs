//! HTTP API for contactbook.

pub mod mailer;
pub mod push;
pub mod routes;
pub mod singleton;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

/// Build the full router over `state`.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::auth::router())
        .merge(routes::contacts::router())
        .merge(routes::events::router())
        .merge(routes::calendar::router())
        .merge(routes::notifications::router())
        .merge(routes::cron::router())
        .with_state(state)
        .layer(cors)
}
