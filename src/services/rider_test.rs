use super::*;
use crate::services::estimate::fallback_estimate;
use crate::state::test_helpers::MockLlm;
use crate::llm::types::LlmChat;

const MATCH_DELAY: Duration = Duration::from_millis(3000);

const REPLY: &str =
    r#"{"distance":"8 km","duration":"20 min","priceStandard":15,"pricePremium":22.5,"priceXL":30}"#;

async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
}

fn flow() -> RiderFlow {
    RiderFlow::new(Uuid::new_v4(), MATCH_DELAY)
}

fn offline_gateway() -> EstimationGateway {
    EstimationGateway::new(None, 256)
}

fn gateway_with(mock: MockLlm) -> EstimationGateway {
    EstimationGateway::new(Some(Arc::new(mock) as Arc<dyn LlmChat>), 256)
}

async fn confirmed(flow: &RiderFlow) {
    flow.search(&offline_gateway(), "123 Main St", "Airport").await.unwrap();
    flow.confirm().unwrap();
}

// =============================================================================
// search
// =============================================================================

#[tokio::test(start_paused = true)]
async fn new_flow_starts_in_search() {
    let snap = flow().snapshot();
    assert_eq!(snap.step, RiderStep::Search);
    assert!(snap.estimate.is_none());
    assert!(snap.price.is_none());
    assert_eq!(snap.ride_type, RideType::Standard);
    assert_eq!(snap.ride_status, RideStatus::Pending);
    assert_eq!(snap.map.markers, vec![MapMarker::at(MAP_CENTER, MarkerKind::Driver)]);
}

#[tokio::test(start_paused = true)]
async fn search_moves_to_confirm_with_model_estimate() {
    let flow = flow();
    let snap = flow.search(&gateway_with(MockLlm::replying(REPLY)), "Home", "Work").await.unwrap();
    assert_eq!(snap.step, RiderStep::Confirm);
    assert_eq!(snap.pickup, "Home");
    assert_eq!(snap.dropoff, "Work");
    assert_eq!(snap.estimate.as_ref().map(|e| e.distance.as_str()), Some("8 km"));
    assert_eq!(snap.ride_type, RideType::Standard);
    assert_eq!(snap.price, Some(15.0));
}

#[tokio::test(start_paused = true)]
async fn search_uses_fallback_when_model_fails() {
    let flow = flow();
    let snap = flow.search(&gateway_with(MockLlm::failing()), "A", "B").await.unwrap();
    assert_eq!(snap.step, RiderStep::Confirm);
    assert_eq!(snap.estimate, Some(fallback_estimate()));
}

#[tokio::test(start_paused = true)]
async fn blank_input_blocks_search_without_model_call() {
    let mock = Arc::new(MockLlm::replying(REPLY));
    let gateway = EstimationGateway::new(Some(Arc::clone(&mock) as Arc<dyn LlmChat>), 256);
    let flow = flow();

    let err = flow.search(&gateway, "  ", "Work").await.unwrap_err();
    assert!(matches!(err, RiderError::MissingLocations));
    let err = flow.search(&gateway, "Home", "").await.unwrap_err();
    assert_eq!(err.error_code(), "E_RIDER_MISSING_LOCATIONS");

    assert_eq!(flow.snapshot().step, RiderStep::Search);
    assert!(mock.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn search_outside_search_step_is_rejected() {
    let flow = flow();
    flow.search(&offline_gateway(), "A", "B").await.unwrap();
    let err = flow.search(&offline_gateway(), "C", "D").await.unwrap_err();
    assert!(matches!(err, RiderError::InvalidTransition { step: RiderStep::Confirm, .. }));
    assert_eq!(flow.snapshot().pickup, "A");
}

#[tokio::test(start_paused = true)]
async fn cancel_during_estimate_discards_result() {
    let flow = flow();
    let gateway = gateway_with(MockLlm::replying(REPLY).with_delay(Duration::from_millis(200)));

    let (result, ()) = tokio::join!(flow.search(&gateway, "A", "B"), async {
        settle(50).await;
        flow.cancel();
    });

    assert!(matches!(result, Err(RiderError::Superseded)));
    let snap = flow.snapshot();
    assert_eq!(snap.step, RiderStep::Search);
    assert!(snap.estimate.is_none());
}

// =============================================================================
// confirm step
// =============================================================================

#[tokio::test(start_paused = true)]
async fn select_ride_type_reprices_without_reestimating() {
    let flow = flow();
    flow.search(&offline_gateway(), "A", "B").await.unwrap();

    let snap = flow.select_ride_type(RideType::Xl).unwrap();
    assert_eq!(snap.ride_type, RideType::Xl);
    assert_eq!(snap.price, Some(25.00));
    let snap = flow.select_ride_type(RideType::Premium).unwrap();
    assert_eq!(snap.price, Some(18.75));
    assert_eq!(snap.estimate, Some(fallback_estimate()));
}

#[tokio::test(start_paused = true)]
async fn select_ride_type_outside_confirm_is_rejected() {
    let err = flow().select_ride_type(RideType::Premium).unwrap_err();
    assert_eq!(err.error_code(), "E_RIDER_INVALID_TRANSITION");
}

#[tokio::test(start_paused = true)]
async fn back_discards_estimate_but_keeps_addresses() {
    let flow = flow();
    flow.search(&offline_gateway(), "A", "B").await.unwrap();
    flow.select_ride_type(RideType::Premium).unwrap();

    let snap = flow.back().unwrap();
    assert_eq!(snap.step, RiderStep::Search);
    assert!(snap.estimate.is_none());
    assert_eq!(snap.ride_type, RideType::Standard);
    assert_eq!((snap.pickup.as_str(), snap.dropoff.as_str()), ("A", "B"));
}

#[tokio::test(start_paused = true)]
async fn confirm_from_search_is_rejected() {
    let flow = flow();
    let err = flow.confirm().unwrap_err();
    assert!(matches!(err, RiderError::InvalidTransition { action: "confirm", step: RiderStep::Search }));
    assert_eq!(flow.snapshot().step, RiderStep::Search);
}

// =============================================================================
// searching → trip
// =============================================================================

#[tokio::test(start_paused = true)]
async fn match_arrives_after_delay() {
    let flow = flow();
    confirmed(&flow).await;
    let snap = flow.snapshot();
    assert_eq!(snap.step, RiderStep::Searching);
    assert_eq!(snap.ride_status, RideStatus::Pending);

    settle(2999).await;
    assert_eq!(flow.snapshot().step, RiderStep::Searching);

    settle(2).await;
    let snap = flow.snapshot();
    assert_eq!(snap.step, RiderStep::Trip);
    assert_eq!(snap.ride_status, RideStatus::Accepted);
}

#[tokio::test(start_paused = true)]
async fn trip_shows_matched_driver_and_dropoff_marker() {
    let flow = flow();
    confirmed(&flow).await;
    settle(3100).await;

    let snap = flow.snapshot();
    let driver = snap.driver.unwrap();
    assert_eq!(driver.name, "Sarah Connor");
    assert_eq!(driver.vehicle_plate, "ABC-1234");
    assert_eq!(driver.eta, "2 min");
    assert_eq!(driver.meeting_point, "123 Main St");
    assert_eq!(snap.map.markers.len(), 2);
    assert_eq!(snap.map.markers[1].kind, MarkerKind::Dropoff);
    assert!((snap.map.markers[1].lat - 40.7228).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_searching_prevents_trip() {
    let flow = flow();
    confirmed(&flow).await;
    settle(1500).await;

    let snap = flow.cancel();
    assert_eq!(snap.step, RiderStep::Search);

    settle(5000).await;
    let snap = flow.snapshot();
    assert_eq!(snap.step, RiderStep::Search);
    assert_eq!(snap.ride_status, RideStatus::Pending);
    assert!(snap.driver.is_none());
}

#[tokio::test(start_paused = true)]
async fn cancel_from_trip_returns_to_search() {
    let flow = flow();
    confirmed(&flow).await;
    settle(3100).await;
    assert_eq!(flow.snapshot().step, RiderStep::Trip);

    let snap = flow.cancel();
    assert_eq!(snap.step, RiderStep::Search);
    assert!(snap.estimate.is_none());
    assert_eq!(snap.ride_status, RideStatus::Pending);
    assert_eq!(snap.pickup, "123 Main St");
}

#[tokio::test(start_paused = true)]
async fn rebooking_after_cancel_uses_fresh_timer() {
    let flow = flow();
    confirmed(&flow).await;
    settle(2000).await;
    flow.cancel();

    flow.search(&offline_gateway(), "X", "Y").await.unwrap();
    flow.confirm().unwrap();
    settle(1500).await;
    assert_eq!(flow.snapshot().step, RiderStep::Searching);
    settle(1600).await;
    assert_eq!(flow.snapshot().step, RiderStep::Trip);
}

#[tokio::test(start_paused = true)]
async fn reset_clears_addresses_and_timer() {
    let flow = flow();
    confirmed(&flow).await;
    flow.reset();

    settle(5000).await;
    let snap = flow.snapshot();
    assert_eq!(snap.step, RiderStep::Search);
    assert!(snap.pickup.is_empty());
    assert!(snap.dropoff.is_empty());
}

#[test]
fn snapshot_serializes_lowercase_step() {
    let snap = RiderState::default().snapshot();
    let value = serde_json::to_value(&snap).unwrap();
    assert_eq!(value["step"], "search");
    assert_eq!(value["ride_status"], "PENDING");
    assert_eq!(value["ride_type"], "Standard");
    assert_eq!(value["map"]["markers"][0]["kind"], "driver");
}
