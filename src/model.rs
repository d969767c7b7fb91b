//! Domain model shared by the ride flows, gateways and routes.
//!
//! DESIGN
//! ======
//! Every entity here is transient: it lives in a session's memory and is
//! serialized straight into JSON responses. Nothing is persisted.

use serde::{Deserialize, Serialize};

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Rider,
    Driver,
    Admin,
}

impl UserRole {
    /// Page path of this role's dashboard.
    #[must_use]
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Self::Rider => "/rider",
            Self::Driver => "/driver",
            Self::Admin => "/admin",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rider => "RIDER",
            Self::Driver => "DRIVER",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_balance: Option<f64>,
}

/// A user who drives. Serialized flat, with the user fields inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverProfile {
    #[serde(flatten)]
    pub user: User,
    pub vehicle_model: String,
    pub vehicle_plate: String,
    pub is_online: bool,
    pub trips_completed: u32,
    pub earnings_today: f64,
}

/// Identity held by an authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Profile {
    Driver(DriverProfile),
    User(User),
}

impl Profile {
    #[must_use]
    pub fn user(&self) -> &User {
        match self {
            Self::Driver(d) => &d.user,
            Self::User(u) => u,
        }
    }

    #[must_use]
    pub fn role(&self) -> UserRole {
        self.user().role
    }
}

// =============================================================================
// GEOGRAPHY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn offset(self, dlat: f64, dlng: f64) -> Self {
        Self { lat: self.lat + dlat, lng: self.lng + dlng }
    }
}

/// Default map center (New York).
pub const MAP_CENTER: LatLng = LatLng { lat: 40.7128, lng: -74.0060 };

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Pickup,
    Dropoff,
    Driver,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lng: f64,
    pub kind: MarkerKind,
}

impl MapMarker {
    #[must_use]
    pub fn at(pos: LatLng, kind: MarkerKind) -> Self {
        Self { lat: pos.lat, lng: pos.lng, kind }
    }
}

/// What a map collaborator needs to draw: a center and typed markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: LatLng,
    pub markers: Vec<MapMarker>,
}

// =============================================================================
// RIDES
// =============================================================================

/// Fare/service tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RideType {
    #[default]
    Standard,
    Premium,
    #[serde(rename = "XL")]
    Xl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    /// Searching for a driver.
    #[default]
    Pending,
    /// Driver on the way.
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

/// Distance, duration and the three price points for one pickup/dropoff pair.
///
/// All five fields are mandatory; the estimation gateway rejects anything
/// less before it reaches a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideEstimate {
    pub distance: String,
    pub duration: String,
    pub price_standard: f64,
    pub price_premium: f64,
    #[serde(rename = "priceXL")]
    pub price_xl: f64,
}

impl RideEstimate {
    #[must_use]
    pub fn price_for(&self, ride_type: RideType) -> f64 {
        match ride_type {
            RideType::Standard => self.price_standard,
            RideType::Premium => self.price_premium,
            RideType::Xl => self.price_xl,
        }
    }
}

/// A booked ride. The flows never materialize one; it appears only in
/// admin reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: String,
    pub rider_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    pub pickup: Location,
    pub dropoff: Location,
    pub status: RideStatus,
    pub price: f64,
    pub distance: String,
    pub duration: String,
    pub ride_type: RideType,
    pub date: String,
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
