//! Page surface — role-based route guard and JSON page views.
//!
//! DESIGN
//! ======
//! `resolve_route` is the whole guard: a pure function from path and role
//! to either a page to render or a redirect target. Page handlers render
//! JSON view models; there is no HTML here.

use axum::http::Uri;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::Serialize;

use super::auth::SessionCtx;
use super::error::ApiError;
use crate::model::{Profile, UserRole};
use crate::services::admin::{self, AdminOverview};
use crate::services::auth::AuthState;
use crate::services::driver::DriverSnapshot;
use crate::services::rider::RiderSnapshot;
use crate::services::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Landing,
    Login,
    Rider,
    Driver,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Page),
    Redirect(&'static str),
}

fn dashboard(role: UserRole) -> Page {
    match role {
        UserRole::Rider => Page::Rider,
        UserRole::Driver => Page::Driver,
        UserRole::Admin => Page::Admin,
    }
}

/// Decide what `path` shows for a visitor holding `role` (`None` when not
/// signed in).
#[must_use]
pub fn resolve_route(path: &str, role: Option<UserRole>) -> RouteDecision {
    let required = match path {
        "/" => return RouteDecision::Render(Page::Landing),
        "/login" => {
            return match role {
                Some(role) => RouteDecision::Redirect(role.dashboard_path()),
                None => RouteDecision::Render(Page::Login),
            };
        }
        "/rider" => UserRole::Rider,
        "/driver" => UserRole::Driver,
        "/admin" => UserRole::Admin,
        _ => return RouteDecision::Redirect("/"),
    };

    match role {
        None => RouteDecision::Redirect("/login"),
        Some(role) if role == required => RouteDecision::Render(dashboard(role)),
        Some(role) => RouteDecision::Redirect(role.dashboard_path()),
    }
}

// =============================================================================
// VIEWS
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(tag = "page", rename_all = "lowercase")]
pub enum PageView {
    Landing { brand: &'static str, tagline: &'static str, login_path: &'static str },
    Login { roles: [UserRole; 3], session: AuthState },
    Rider { user: Profile, ride: RiderSnapshot },
    Driver { user: Profile, shift: DriverSnapshot },
    Admin { user: Profile, overview: AdminOverview },
}

fn landing() -> PageView {
    PageView::Landing { brand: "Speedride", tagline: "Move fast, ride safe.", login_path: "/login" }
}

fn render(page: Page, session: Option<&Session>, profile: Option<Profile>) -> PageView {
    match (page, session, profile) {
        (Page::Login, session, _) => PageView::Login {
            roles: [UserRole::Rider, UserRole::Driver, UserRole::Admin],
            session: session.map_or(AuthState::Anonymous, |s| s.auth.state()),
        },
        (Page::Rider, Some(session), Some(user)) => PageView::Rider { user, ride: session.rider.snapshot() },
        (Page::Driver, Some(session), Some(user)) => PageView::Driver { user, shift: session.driver.snapshot() },
        (Page::Admin, _, Some(user)) => PageView::Admin { user, overview: admin::overview() },
        _ => landing(),
    }
}

/// Every page path and the wildcard fallback.
pub async fn page(uri: Uri, ctx: SessionCtx) -> Response {
    let path = uri.path();
    if path.starts_with("/api/") {
        return ApiError::NotFound.into_response();
    }

    let profile = ctx.session.as_ref().and_then(|s| s.auth.profile());
    match resolve_route(path, profile.as_ref().map(Profile::role)) {
        RouteDecision::Redirect(to) => Redirect::temporary(to).into_response(),
        RouteDecision::Render(page) => Json(render(page, ctx.session.as_deref(), profile)).into_response(),
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
