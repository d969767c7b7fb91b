//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the JSON API under `/api`, the guarded page
//! surface (`/`, `/login`, `/rider`, `/driver`, `/admin`) and a wildcard
//! fallback that sends unknown pages home.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod driver;
pub mod error;
pub mod pages;
pub mod rider;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session_state))
        .route("/api/auth/me", get(auth::me))
        .route("/api/rider", get(rider::snapshot))
        .route("/api/rider/search", post(rider::search))
        .route("/api/rider/ride-type", post(rider::select_ride_type))
        .route("/api/rider/back", post(rider::back))
        .route("/api/rider/confirm", post(rider::confirm))
        .route("/api/rider/cancel", post(rider::cancel))
        .route("/api/driver", get(driver::snapshot))
        .route("/api/driver/toggle", post(driver::toggle))
        .route("/api/driver/accept", post(driver::accept))
        .route("/api/driver/decline", post(driver::decline))
        .route("/api/admin/overview", get(admin::overview))
        .route("/api/chat", get(chat::transcript).post(chat::send))
        .route("/api/estimate", post(rider::estimate))
        .route("/", get(pages::page))
        .route("/login", get(pages::page))
        .route("/rider", get(pages::page))
        .route("/driver", get(pages::page))
        .route("/admin", get(pages::page))
        .route("/healthz", get(healthz))
        .fallback(pages::page)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
