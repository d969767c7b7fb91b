use super::*;

const REQUEST_DELAY: Duration = Duration::from_millis(2000);

async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
}

fn flow() -> DriverFlow {
    DriverFlow::new(Uuid::new_v4(), REQUEST_DELAY, false)
}

async fn with_request(flow: &DriverFlow) {
    flow.toggle_online().unwrap();
    settle(2100).await;
    assert!(flow.snapshot().has_request);
}

// =============================================================================
// availability
// =============================================================================

#[tokio::test(start_paused = true)]
async fn new_flow_is_offline() {
    let snap = flow().snapshot();
    assert!(!snap.is_online);
    assert_eq!(snap.phase, DriverPhase::Offline);
    assert!(!snap.has_request);
    assert_eq!(snap.earnings_today, 125.00);
    assert!(snap.map.markers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn request_arrives_after_delay_online() {
    let flow = flow();
    let snap = flow.toggle_online().unwrap();
    assert!(snap.is_online);
    assert_eq!(snap.phase, DriverPhase::Online);

    settle(1999).await;
    assert!(!flow.snapshot().has_request);

    settle(2).await;
    let snap = flow.snapshot();
    assert!(snap.has_request);
    assert_eq!(snap.phase, DriverPhase::RequestPending);
    assert_eq!(snap.request, Some(mock_ride_request()));
    assert_eq!(snap.map.markers, vec![MapMarker::at(LatLng { lat: 40.72, lng: -74.01 }, MarkerKind::Pickup)]);
}

#[tokio::test(start_paused = true)]
async fn offline_before_delay_never_gets_request() {
    let flow = flow();
    flow.toggle_online().unwrap();
    settle(1000).await;
    let snap = flow.toggle_online().unwrap();
    assert!(!snap.is_online);

    settle(10_000).await;
    let snap = flow.snapshot();
    assert!(!snap.has_request);
    assert_eq!(snap.phase, DriverPhase::Offline);
}

#[tokio::test(start_paused = true)]
async fn toggle_while_request_pending_is_rejected() {
    let flow = flow();
    with_request(&flow).await;
    let err = flow.toggle_online().unwrap_err();
    assert!(matches!(err, DriverError::RequestPending));
    assert!(flow.snapshot().is_online);
}

#[tokio::test(start_paused = true)]
async fn going_online_again_restarts_delay() {
    let flow = flow();
    flow.toggle_online().unwrap();
    settle(1500).await;
    flow.toggle_online().unwrap();
    flow.toggle_online().unwrap();

    settle(1500).await;
    assert!(!flow.snapshot().has_request);
    settle(600).await;
    assert!(flow.snapshot().has_request);
}

// =============================================================================
// accept / decline
// =============================================================================

#[tokio::test(start_paused = true)]
async fn accept_clears_request_and_stays_online() {
    let flow = flow();
    with_request(&flow).await;

    let accepted = flow.accept().unwrap();
    assert_eq!(accepted.message, "Ride Accepted!");
    assert_eq!(accepted.request.pickup.address, "123 Broadway St");
    assert_eq!(accepted.request.dropoff.address, "Central Park West");
    assert!(accepted.driver.is_online);
    assert!(!accepted.driver.has_request);

    settle(10_000).await;
    assert!(!flow.snapshot().has_request);
}

#[tokio::test(start_paused = true)]
async fn accept_without_request_fails() {
    let flow = flow();
    flow.toggle_online().unwrap();
    let err = flow.accept().unwrap_err();
    assert_eq!(err.error_code(), "E_DRIVER_NO_REQUEST");
}

#[tokio::test(start_paused = true)]
async fn decline_returns_to_online_without_rearming() {
    let flow = flow();
    with_request(&flow).await;

    let snap = flow.decline().unwrap();
    assert_eq!(snap.phase, DriverPhase::Online);
    assert!(!snap.has_request);

    settle(10_000).await;
    assert!(!flow.snapshot().has_request);
}

#[tokio::test(start_paused = true)]
async fn decline_rearms_when_configured() {
    let flow = DriverFlow::new(Uuid::new_v4(), REQUEST_DELAY, true);
    with_request(&flow).await;
    flow.decline().unwrap();

    settle(1000).await;
    assert!(!flow.snapshot().has_request);
    settle(1100).await;
    assert!(flow.snapshot().has_request);
}

#[tokio::test(start_paused = true)]
async fn decline_without_request_fails() {
    assert!(matches!(flow().decline(), Err(DriverError::NoPendingRequest)));
}

#[tokio::test(start_paused = true)]
async fn reset_goes_offline_and_cancels_timer() {
    let flow = flow();
    flow.toggle_online().unwrap();
    flow.reset();

    settle(5000).await;
    let snap = flow.snapshot();
    assert!(!snap.is_online);
    assert!(!snap.has_request);
}

#[test]
fn phase_serializes_camel_case() {
    assert_eq!(serde_json::to_value(DriverPhase::RequestPending).unwrap(), "requestPending");
    let value = serde_json::to_value(mock_ride_request()).unwrap();
    assert_eq!(value["fare"], 15.5);
    assert_eq!(value["ride_type"], "Standard");
    assert_eq!(value["rider_rating"], 4.8);
}
