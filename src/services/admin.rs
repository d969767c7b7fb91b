//! Admin overview — static fleet and revenue figures for the admin dashboard.

use serde::Serialize;

use super::auth::{mock_driver, mock_rider};
use crate::model::{Location, MAP_CENTER, MapMarker, MapView, MarkerKind, Ride, RideStatus, RideType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: f64,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentRide {
    #[serde(flatten)]
    pub ride: Ride,
    pub rider_name: String,
    pub driver_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminOverview {
    pub rides_today: StatCard,
    pub active_drivers: StatCard,
    pub revenue: StatCard,
    pub pending_approvals: StatCard,
    pub recent_rides: Vec<RecentRide>,
    pub fleet: MapView,
}

#[must_use]
pub fn overview() -> AdminOverview {
    AdminOverview {
        rides_today: StatCard { label: "Total Rides Today", value: 1240.0, note: "+12% from yesterday".into() },
        active_drivers: StatCard { label: "Active Drivers", value: 342.0, note: "Total: 850 registered".into() },
        revenue: StatCard { label: "Revenue", value: 14205.0, note: "+8% this week".into() },
        pending_approvals: StatCard { label: "Pending Approvals", value: 12.0, note: "Action required".into() },
        recent_rides: (1..=5).map(recent_ride).collect(),
        fleet: MapView {
            center: MAP_CENTER,
            markers: vec![
                MapMarker::at(MAP_CENTER, MarkerKind::Driver),
                MapMarker::at(MAP_CENTER.offset(0.01, -0.01), MarkerKind::Driver),
                MapMarker::at(MAP_CENTER.offset(-0.01, 0.01), MarkerKind::Driver),
            ],
        },
    }
}

fn recent_ride(n: u32) -> RecentRide {
    let rider = mock_rider();
    let driver = mock_driver();
    RecentRide {
        ride: Ride {
            id: format!("#RID-202{n}"),
            rider_id: rider.id,
            driver_id: Some(driver.user.id),
            pickup: Location { lat: 40.72, lng: -74.01, address: "123 Broadway St".into() },
            dropoff: Location { lat: 40.7812, lng: -73.9665, address: "Central Park West".into() },
            status: RideStatus::Completed,
            price: 24.50,
            distance: "3.5 km".into(),
            duration: "12 min".into(),
            ride_type: RideType::Standard,
            date: time::OffsetDateTime::now_utc().date().to_string(),
        },
        rider_name: rider.name,
        driver_name: short_name(&driver.user.name),
    }
}

/// "Sarah Connor" → "Sarah C."
fn short_name(name: &str) -> String {
    match name.split_once(' ').and_then(|(first, last)| Some((first, last.chars().next()?))) {
        Some((first, initial)) => format!("{first} {initial}."),
        None => name.to_string(),
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
