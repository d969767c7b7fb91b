//! Admin routes.

use axum::response::Json;

use super::auth::AuthUser;
use super::error::ApiError;
use crate::model::UserRole;
use crate::services::admin::{self, AdminOverview};

/// `GET /api/admin/overview` — fleet and revenue figures.
pub async fn overview(auth: AuthUser) -> Result<Json<AdminOverview>, ApiError> {
    auth.require(UserRole::Admin)?;
    Ok(Json(admin::overview()))
}
