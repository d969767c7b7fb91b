//! Rider ride flow — search → confirm → searching → trip.
//!
//! DESIGN
//! ======
//! One flow per session. `search` releases the lock while the estimation
//! gateway runs and only applies the estimate if nothing reset the flow in
//! the meantime (epoch check). `confirm` arms the match timer; `cancel` and
//! `reset` invalidate both the timer and any in-flight estimate, so a late
//! completion can never push the flow into `trip`.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::auth::mock_driver;
use super::estimate::EstimationGateway;
use super::lock;
use super::timer::TimerSlot;
use crate::model::{MAP_CENTER, MapMarker, MapView, MarkerKind, RideEstimate, RideStatus, RideType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiderStep {
    #[default]
    Search,
    Confirm,
    Searching,
    Trip,
}

impl RiderStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Confirm => "confirm",
            Self::Searching => "searching",
            Self::Trip => "trip",
        }
    }
}

impl std::fmt::Display for RiderStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RiderError {
    #[error("pickup and dropoff are required")]
    MissingLocations,
    #[error("cannot {action} while in {step}")]
    InvalidTransition { action: &'static str, step: RiderStep },
    #[error("search was superseded by another action")]
    Superseded,
}

impl RiderError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingLocations => "E_RIDER_MISSING_LOCATIONS",
            Self::InvalidTransition { .. } => "E_RIDER_INVALID_TRANSITION",
            Self::Superseded => "E_RIDER_SUPERSEDED",
        }
    }
}

/// Driver summary shown once a ride is matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedDriver {
    pub name: String,
    pub vehicle_model: String,
    pub vehicle_plate: String,
    pub rating: Option<f64>,
    pub avatar_url: Option<String>,
    pub eta: String,
    pub meeting_point: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiderSnapshot {
    pub step: RiderStep,
    pub pickup: String,
    pub dropoff: String,
    pub estimate: Option<RideEstimate>,
    pub ride_type: RideType,
    pub price: Option<f64>,
    pub ride_status: RideStatus,
    pub driver: Option<MatchedDriver>,
    pub map: MapView,
}

#[derive(Default)]
struct RiderState {
    step: RiderStep,
    pickup: String,
    dropoff: String,
    estimate: Option<RideEstimate>,
    ride_type: RideType,
    ride_status: RideStatus,
    timer: TimerSlot,
}

impl RiderState {
    fn expect_step(&self, step: RiderStep, action: &'static str) -> Result<(), RiderError> {
        if self.step == step {
            Ok(())
        } else {
            Err(RiderError::InvalidTransition { action, step: self.step })
        }
    }

    /// Back to `search`, keeping the typed addresses.
    fn clear_ride(&mut self) {
        self.timer.invalidate();
        self.step = RiderStep::Search;
        self.estimate = None;
        self.ride_type = RideType::default();
        self.ride_status = RideStatus::default();
    }

    fn snapshot(&self) -> RiderSnapshot {
        let trip = self.step == RiderStep::Trip;
        let mut markers = vec![MapMarker::at(MAP_CENTER, MarkerKind::Driver)];
        if trip {
            markers.push(MapMarker::at(MAP_CENTER.offset(0.01, 0.01), MarkerKind::Dropoff));
        }
        RiderSnapshot {
            step: self.step,
            pickup: self.pickup.clone(),
            dropoff: self.dropoff.clone(),
            estimate: self.estimate.clone(),
            ride_type: self.ride_type,
            price: self.estimate.as_ref().map(|e| e.price_for(self.ride_type)),
            ride_status: self.ride_status,
            driver: trip.then(|| matched_driver(&self.pickup)),
            map: MapView { center: MAP_CENTER, markers },
        }
    }
}

fn matched_driver(pickup: &str) -> MatchedDriver {
    let driver = mock_driver();
    MatchedDriver {
        name: driver.user.name,
        vehicle_model: driver.vehicle_model,
        vehicle_plate: driver.vehicle_plate,
        rating: driver.user.rating,
        avatar_url: driver.user.avatar_url,
        eta: "2 min".into(),
        meeting_point: pickup.to_string(),
    }
}

pub struct RiderFlow {
    session_id: Uuid,
    match_delay: Duration,
    inner: Arc<Mutex<RiderState>>,
}

impl RiderFlow {
    #[must_use]
    pub fn new(session_id: Uuid, match_delay: Duration) -> Self {
        Self { session_id, match_delay, inner: Arc::new(Mutex::new(RiderState::default())) }
    }

    #[must_use]
    pub fn snapshot(&self) -> RiderSnapshot {
        lock(&self.inner).snapshot()
    }

    /// Estimate the ride and move to `confirm`.
    ///
    /// # Errors
    ///
    /// `MissingLocations` for blank input (nothing changes, no model call),
    /// `InvalidTransition` outside `search`, `Superseded` when the flow was
    /// cancelled or searched again while the estimate was in flight.
    pub async fn search(
        &self,
        gateway: &EstimationGateway,
        pickup: &str,
        dropoff: &str,
    ) -> Result<RiderSnapshot, RiderError> {
        let (pickup, dropoff) = (pickup.trim(), dropoff.trim());
        let epoch = {
            let mut state = lock(&self.inner);
            state.expect_step(RiderStep::Search, "search")?;
            if pickup.is_empty() || dropoff.is_empty() {
                return Err(RiderError::MissingLocations);
            }
            state.pickup = pickup.to_string();
            state.dropoff = dropoff.to_string();
            state.timer.invalidate()
        };

        let estimate = gateway.estimate(pickup, dropoff).await;

        let mut state = lock(&self.inner);
        if !state.timer.is_current(epoch) || state.step != RiderStep::Search {
            return Err(RiderError::Superseded);
        }
        state.estimate = Some(estimate);
        state.ride_type = RideType::Standard;
        state.step = RiderStep::Confirm;
        info!(session = %self.session_id, step = %state.step, "rider: estimate ready");
        Ok(state.snapshot())
    }

    /// Change the selected tier without re-estimating.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside `confirm`.
    pub fn select_ride_type(&self, ride_type: RideType) -> Result<RiderSnapshot, RiderError> {
        let mut state = lock(&self.inner);
        state.expect_step(RiderStep::Confirm, "select a ride type")?;
        state.ride_type = ride_type;
        Ok(state.snapshot())
    }

    /// Return to `search`, discarding the estimate.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside `confirm`.
    pub fn back(&self) -> Result<RiderSnapshot, RiderError> {
        let mut state = lock(&self.inner);
        state.expect_step(RiderStep::Confirm, "go back")?;
        state.clear_ride();
        Ok(state.snapshot())
    }

    /// Request the ride and start looking for a driver.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside `confirm`.
    pub fn confirm(&self) -> Result<RiderSnapshot, RiderError> {
        let mut state = lock(&self.inner);
        state.expect_step(RiderStep::Confirm, "confirm")?;
        state.step = RiderStep::Searching;
        state.ride_status = RideStatus::Pending;

        let weak = Arc::downgrade(&self.inner);
        let session_id = self.session_id;
        state.timer.arm(self.match_delay, move |epoch| complete_match(&weak, epoch, session_id));
        info!(session = %self.session_id, ride_type = ?state.ride_type, "rider: searching for driver");
        Ok(state.snapshot())
    }

    /// Abandon the ride from any step.
    pub fn cancel(&self) -> RiderSnapshot {
        let mut state = lock(&self.inner);
        let from = state.step;
        state.clear_ride();
        info!(session = %self.session_id, %from, "rider: ride cancelled");
        state.snapshot()
    }

    /// Cancel and forget the typed addresses.
    pub fn reset(&self) {
        let mut state = lock(&self.inner);
        state.clear_ride();
        state.pickup.clear();
        state.dropoff.clear();
    }
}

fn complete_match(inner: &Weak<Mutex<RiderState>>, epoch: u64, session_id: Uuid) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut state = lock(&inner);
    if !state.timer.is_current(epoch) || state.step != RiderStep::Searching {
        return;
    }
    state.timer.disarm();
    state.step = RiderStep::Trip;
    state.ride_status = RideStatus::Accepted;
    info!(session = %session_id, "rider: driver matched");
}

#[cfg(test)]
#[path = "rider_test.rs"]
mod tests;
