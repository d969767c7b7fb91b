//! Auth routes — role login, logout, session state, session extractors.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use super::error::ApiError;
use crate::model::{Profile, UserRole};
use crate::services::auth::AuthState;
use crate::services::session::Session;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// The caller's session, if the cookie names a live one. Never rejects.
#[derive(Default)]
pub struct SessionCtx {
    pub token: Option<String>,
    pub session: Option<Arc<Session>>,
}

impl<S> FromRequestParts<S> for SessionCtx
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Ok(Self::default());
        }

        let app_state = AppState::from_ref(state);
        let session = app_state.sessions.get(token).await;
        Ok(Self { token: session.is_some().then(|| token.to_owned()), session })
    }
}

/// Signed-in user extracted from the session cookie.
/// Use as a handler parameter to require authentication; a pending login
/// does not count.
#[derive(Clone)]
pub struct AuthUser {
    pub token: String,
    pub session: Arc<Session>,
    pub profile: Profile,
}

impl AuthUser {
    /// # Errors
    ///
    /// `Forbidden` when the user holds another role.
    pub fn require(&self, role: UserRole) -> Result<(), ApiError> {
        if self.profile.role() == role { Ok(()) } else { Err(ApiError::Forbidden { required: role }) }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(ctx) = SessionCtx::from_request_parts(parts, state).await;
        let (Some(token), Some(session)) = (ctx.token, ctx.session) else {
            return Err(ApiError::Unauthorized);
        };
        let profile = session.auth.profile().ok_or(ApiError::Unauthorized)?;
        Ok(Self { token, session, profile })
    }
}

/// The caller's session, creating one (and a cookie for it) when absent.
pub(crate) async fn ensure_session(state: &AppState, ctx: SessionCtx) -> (CookieJar, Arc<Session>) {
    match ctx.session {
        Some(session) => (CookieJar::new(), session),
        None => {
            let (token, session) = state.sessions.create().await;
            (CookieJar::new().add(session_cookie(token)), session)
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub role: UserRole,
}

/// `POST /api/auth/login` — start a role login; completes after the login delay.
pub async fn login(State(state): State<AppState>, ctx: SessionCtx, Json(req): Json<LoginRequest>) -> Response {
    let (jar, session) = ensure_session(&state, ctx).await;
    let auth = session.auth.login(req.role);
    (StatusCode::ACCEPTED, jar, Json(auth)).into_response()
}

/// `POST /api/auth/logout` — drop the session, cancel its timers, clear cookie.
pub async fn logout(State(state): State<AppState>, ctx: SessionCtx) -> impl IntoResponse {
    if let Some(token) = ctx.token {
        state.sessions.remove(&token).await;
    }
    (CookieJar::new().add(cleared_session_cookie()), StatusCode::NO_CONTENT)
}

/// `GET /api/auth/session` — current auth state; anonymous without a session.
pub async fn session_state(ctx: SessionCtx) -> Json<AuthState> {
    Json(ctx.session.map_or(AuthState::Anonymous, |s| s.auth.state()))
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<Profile> {
    Json(auth.profile)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
