use super::*;

fn sample_estimate() -> RideEstimate {
    RideEstimate {
        distance: "5.2 km".into(),
        duration: "15 min".into(),
        price_standard: 10.8,
        price_premium: 16.2,
        price_xl: 21.6,
    }
}

#[test]
fn user_role_serializes_upper_case() {
    assert_eq!(serde_json::to_string(&UserRole::Rider).unwrap(), "\"RIDER\"");
    let role: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
    assert_eq!(role, UserRole::Admin);
    assert_eq!(UserRole::Driver.to_string(), "DRIVER");
}

#[test]
fn user_role_dashboard_paths() {
    assert_eq!(UserRole::Rider.dashboard_path(), "/rider");
    assert_eq!(UserRole::Driver.dashboard_path(), "/driver");
    assert_eq!(UserRole::Admin.dashboard_path(), "/admin");
}

#[test]
fn estimate_uses_camel_case_keys() {
    let value = serde_json::to_value(sample_estimate()).unwrap();
    assert_eq!(value["priceStandard"], 10.8);
    assert_eq!(value["pricePremium"], 16.2);
    assert_eq!(value["priceXL"], 21.6);
    assert_eq!(value["distance"], "5.2 km");
}

#[test]
fn estimate_missing_field_is_rejected() {
    let raw = r#"{"distance":"1 km","duration":"3 min","priceStandard":4.5,"pricePremium":6.75}"#;
    assert!(serde_json::from_str::<RideEstimate>(raw).is_err());
}

#[test]
fn estimate_price_for_each_type() {
    let est = sample_estimate();
    assert!((est.price_for(RideType::Standard) - 10.8).abs() < f64::EPSILON);
    assert!((est.price_for(RideType::Premium) - 16.2).abs() < f64::EPSILON);
    assert!((est.price_for(RideType::Xl) - 21.6).abs() < f64::EPSILON);
}

#[test]
fn ride_type_default_and_wire_names() {
    assert_eq!(RideType::default(), RideType::Standard);
    assert_eq!(serde_json::to_string(&RideType::Xl).unwrap(), "\"XL\"");
    assert_eq!(serde_json::to_string(&RideType::Premium).unwrap(), "\"Premium\"");
}

#[test]
fn ride_status_wire_names() {
    assert_eq!(RideStatus::default(), RideStatus::Pending);
    assert_eq!(serde_json::to_string(&RideStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
}

#[test]
fn driver_profile_serializes_flat() {
    let profile = Profile::Driver(DriverProfile {
        user: User {
            id: "d9".into(),
            name: "Test Driver".into(),
            email: "d9@speedride.com".into(),
            role: UserRole::Driver,
            avatar_url: None,
            rating: Some(5.0),
            wallet_balance: None,
        },
        vehicle_model: "Kia Niro".into(),
        vehicle_plate: "XYZ-0001".into(),
        is_online: false,
        trips_completed: 3,
        earnings_today: 0.0,
    });
    let value = serde_json::to_value(&profile).unwrap();
    assert_eq!(value["role"], "DRIVER");
    assert_eq!(value["vehicle_plate"], "XYZ-0001");
    assert!(value.get("avatar_url").is_none());
    assert_eq!(profile.role(), UserRole::Driver);
    assert_eq!(profile.user().name, "Test Driver");
}

#[test]
fn marker_kind_is_lowercase() {
    let marker = MapMarker::at(MAP_CENTER.offset(0.01, 0.01), MarkerKind::Dropoff);
    let value = serde_json::to_value(marker).unwrap();
    assert_eq!(value["kind"], "dropoff");
    assert!((marker.lat - 40.7228).abs() < 1e-9);
}
