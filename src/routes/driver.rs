//! Driver routes — availability toggle and request handling.

use axum::response::Json;

use super::auth::AuthUser;
use super::error::ApiError;
use crate::model::UserRole;
use crate::services::driver::{AcceptedRide, DriverSnapshot};

/// `GET /api/driver`
pub async fn snapshot(auth: AuthUser) -> Result<Json<DriverSnapshot>, ApiError> {
    auth.require(UserRole::Driver)?;
    Ok(Json(auth.session.driver.snapshot()))
}

/// `POST /api/driver/toggle` — go online or offline.
pub async fn toggle(auth: AuthUser) -> Result<Json<DriverSnapshot>, ApiError> {
    auth.require(UserRole::Driver)?;
    Ok(Json(auth.session.driver.toggle_online()?))
}

/// `POST /api/driver/accept`
pub async fn accept(auth: AuthUser) -> Result<Json<AcceptedRide>, ApiError> {
    auth.require(UserRole::Driver)?;
    Ok(Json(auth.session.driver.accept()?))
}

/// `POST /api/driver/decline`
pub async fn decline(auth: AuthUser) -> Result<Json<DriverSnapshot>, ApiError> {
    auth.require(UserRole::Driver)?;
    Ok(Json(auth.session.driver.decline()?))
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
