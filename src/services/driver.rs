//! Driver ride flow — offline → online → request pending → online.
//!
//! DESIGN
//! ======
//! Going online arms a timer that manufactures one mock pickup request.
//! Going offline invalidates the timer, so a request can never appear on an
//! offline driver even if the timer was already due. Accept and decline
//! both consume the request; whether decline re-arms the timer is a config
//! switch.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::auth::mock_driver;
use super::lock;
use super::timer::TimerSlot;
use crate::model::{LatLng, Location, MAP_CENTER, MapMarker, MapView, MarkerKind, RideType};

pub const ACCEPTED_MESSAGE: &str = "Ride Accepted!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DriverPhase {
    Offline,
    Online,
    RequestPending,
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("no ride request is pending")]
    NoPendingRequest,
    #[error("accept or decline the pending request first")]
    RequestPending,
}

impl DriverError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoPendingRequest => "E_DRIVER_NO_REQUEST",
            Self::RequestPending => "E_DRIVER_REQUEST_PENDING",
        }
    }
}

/// A manufactured pickup request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideRequest {
    pub fare: f64,
    pub ride_type: RideType,
    pub distance: String,
    pub pickup: Location,
    pub pickup_eta: String,
    pub dropoff: Location,
    pub trip_duration: String,
    pub rider_name: String,
    pub rider_rating: f64,
}

#[must_use]
pub fn mock_ride_request() -> RideRequest {
    RideRequest {
        fare: 15.50,
        ride_type: RideType::Standard,
        distance: "3.5 km".into(),
        pickup: Location { lat: 40.72, lng: -74.01, address: "123 Broadway St".into() },
        pickup_eta: "2 mins away".into(),
        dropoff: Location { lat: 40.7812, lng: -73.9665, address: "Central Park West".into() },
        trip_duration: "15 mins trip".into(),
        rider_name: "Rider Name".into(),
        rider_rating: 4.8,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverSnapshot {
    pub is_online: bool,
    pub phase: DriverPhase,
    pub has_request: bool,
    pub request: Option<RideRequest>,
    pub earnings_today: f64,
    pub map: MapView,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedRide {
    pub message: &'static str,
    pub request: RideRequest,
    pub driver: DriverSnapshot,
}

#[derive(Default)]
struct DriverState {
    online: bool,
    request: Option<RideRequest>,
    timer: TimerSlot,
}

impl DriverState {
    fn phase(&self) -> DriverPhase {
        match (self.online, self.request.is_some()) {
            (false, _) => DriverPhase::Offline,
            (true, false) => DriverPhase::Online,
            (true, true) => DriverPhase::RequestPending,
        }
    }

    fn snapshot(&self) -> DriverSnapshot {
        let markers = self
            .request
            .iter()
            .map(|r| MapMarker::at(LatLng { lat: r.pickup.lat, lng: r.pickup.lng }, MarkerKind::Pickup))
            .collect();
        DriverSnapshot {
            is_online: self.online,
            phase: self.phase(),
            has_request: self.request.is_some(),
            request: self.request.clone(),
            earnings_today: mock_driver().earnings_today,
            map: MapView { center: MAP_CENTER, markers },
        }
    }
}

pub struct DriverFlow {
    session_id: Uuid,
    request_delay: Duration,
    rearm_on_decline: bool,
    inner: Arc<Mutex<DriverState>>,
}

impl DriverFlow {
    #[must_use]
    pub fn new(session_id: Uuid, request_delay: Duration, rearm_on_decline: bool) -> Self {
        Self { session_id, request_delay, rearm_on_decline, inner: Arc::new(Mutex::new(DriverState::default())) }
    }

    #[must_use]
    pub fn snapshot(&self) -> DriverSnapshot {
        lock(&self.inner).snapshot()
    }

    /// Flip availability. Going online schedules a request.
    ///
    /// # Errors
    ///
    /// `RequestPending` while a request awaits an answer.
    pub fn toggle_online(&self) -> Result<DriverSnapshot, DriverError> {
        let mut state = lock(&self.inner);
        if state.request.is_some() {
            return Err(DriverError::RequestPending);
        }

        state.online = !state.online;
        if state.online {
            self.schedule_request(&mut state);
        } else {
            state.timer.invalidate();
        }
        info!(session = %self.session_id, online = state.online, "driver: availability changed");
        Ok(state.snapshot())
    }

    /// Take the pending request.
    ///
    /// # Errors
    ///
    /// `NoPendingRequest` when there is nothing to accept.
    pub fn accept(&self) -> Result<AcceptedRide, DriverError> {
        let mut state = lock(&self.inner);
        let request = state.request.take().ok_or(DriverError::NoPendingRequest)?;
        info!(session = %self.session_id, fare = request.fare, "driver: request accepted");
        Ok(AcceptedRide { message: ACCEPTED_MESSAGE, request, driver: state.snapshot() })
    }

    /// Drop the pending request and stay online.
    ///
    /// # Errors
    ///
    /// `NoPendingRequest` when there is nothing to decline.
    pub fn decline(&self) -> Result<DriverSnapshot, DriverError> {
        let mut state = lock(&self.inner);
        state.request.take().ok_or(DriverError::NoPendingRequest)?;
        if self.rearm_on_decline {
            self.schedule_request(&mut state);
        }
        info!(session = %self.session_id, rearmed = self.rearm_on_decline, "driver: request declined");
        Ok(state.snapshot())
    }

    /// Go offline and forget any request.
    pub fn reset(&self) {
        let mut state = lock(&self.inner);
        state.timer.invalidate();
        state.online = false;
        state.request = None;
    }

    fn schedule_request(&self, state: &mut DriverState) {
        let weak = Arc::downgrade(&self.inner);
        let session_id = self.session_id;
        state.timer.arm(self.request_delay, move |epoch| deliver_request(&weak, epoch, session_id));
    }
}

fn deliver_request(inner: &Weak<Mutex<DriverState>>, epoch: u64, session_id: Uuid) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut state = lock(&inner);
    if !state.timer.is_current(epoch) || !state.online {
        return;
    }
    state.timer.disarm();
    state.request = Some(mock_ride_request());
    info!(session = %session_id, "driver: ride request received");
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
