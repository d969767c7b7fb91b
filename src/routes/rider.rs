//! Rider routes — ride search, tier selection, booking, cancellation.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use super::auth::AuthUser;
use super::error::ApiError;
use crate::model::{RideEstimate, RideType, UserRole};
use crate::services::rider::RiderSnapshot;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchRequest {
    pub pickup: String,
    pub dropoff: String,
}

#[derive(Deserialize)]
pub struct RideTypeRequest {
    pub ride_type: RideType,
}

/// `GET /api/rider` — current ride flow.
pub async fn snapshot(auth: AuthUser) -> Result<Json<RiderSnapshot>, ApiError> {
    auth.require(UserRole::Rider)?;
    Ok(Json(auth.session.rider.snapshot()))
}

/// `POST /api/rider/search` — estimate and move to confirm.
pub async fn search(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SearchRequest>,
) -> Result<Json<RiderSnapshot>, ApiError> {
    auth.require(UserRole::Rider)?;
    let snapshot = auth
        .session
        .rider
        .search(&state.estimator, &req.pickup, &req.dropoff)
        .await?;
    Ok(Json(snapshot))
}

/// `POST /api/rider/ride-type`
pub async fn select_ride_type(auth: AuthUser, Json(req): Json<RideTypeRequest>) -> Result<Json<RiderSnapshot>, ApiError> {
    auth.require(UserRole::Rider)?;
    Ok(Json(auth.session.rider.select_ride_type(req.ride_type)?))
}

/// `POST /api/rider/back`
pub async fn back(auth: AuthUser) -> Result<Json<RiderSnapshot>, ApiError> {
    auth.require(UserRole::Rider)?;
    Ok(Json(auth.session.rider.back()?))
}

/// `POST /api/rider/confirm` — book and start the driver search.
pub async fn confirm(auth: AuthUser) -> Result<Json<RiderSnapshot>, ApiError> {
    auth.require(UserRole::Rider)?;
    Ok(Json(auth.session.rider.confirm()?))
}

/// `POST /api/rider/cancel`
pub async fn cancel(auth: AuthUser) -> Result<Json<RiderSnapshot>, ApiError> {
    auth.require(UserRole::Rider)?;
    Ok(Json(auth.session.rider.cancel()))
}

/// `POST /api/estimate` — price a trip without touching any flow.
pub async fn estimate(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<SearchRequest>,
) -> Result<Json<RideEstimate>, ApiError> {
    let (pickup, dropoff) = (req.pickup.trim(), req.dropoff.trim());
    if pickup.is_empty() || dropoff.is_empty() {
        return Err(ApiError::InvalidInput("pickup and dropoff are required"));
    }
    Ok(Json(state.estimator.estimate(pickup, dropoff).await))
}

#[cfg(test)]
#[path = "rider_test.rs"]
mod tests;
