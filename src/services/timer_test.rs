use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
}

#[test]
fn new_slot_is_idle() {
    let slot = TimerSlot::new();
    assert_eq!(slot.epoch(), 0);
    assert!(slot.is_current(0));
    assert!(!slot.is_armed());
}

#[test]
fn invalidate_bumps_epoch() {
    let mut slot = TimerSlot::new();
    let first = slot.invalidate();
    let second = slot.invalidate();
    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert!(!slot.is_current(first));
    assert!(slot.is_current(second));
}

#[tokio::test(start_paused = true)]
async fn armed_timer_fires_after_delay() {
    let fired = Arc::new(AtomicUsize::new(0));
    let mut slot = TimerSlot::new();
    let counter = Arc::clone(&fired);
    slot.arm(Duration::from_millis(500), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert!(slot.is_armed());

    settle(499).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    settle(2).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!slot.is_armed());
}

#[tokio::test(start_paused = true)]
async fn fire_receives_arm_epoch() {
    let seen = Arc::new(AtomicU64::new(u64::MAX));
    let mut slot = TimerSlot::new();
    let sink = Arc::clone(&seen);
    let epoch = slot.arm(Duration::from_millis(10), move |e| sink.store(e, Ordering::SeqCst));

    settle(20).await;
    assert_eq!(seen.load(Ordering::SeqCst), epoch);
    assert!(slot.is_current(epoch));
}

#[tokio::test(start_paused = true)]
async fn invalidate_cancels_pending_timer() {
    let fired = Arc::new(AtomicUsize::new(0));
    let mut slot = TimerSlot::new();
    let counter = Arc::clone(&fired);
    slot.arm(Duration::from_millis(2000), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    settle(1000).await;
    slot.invalidate();
    assert!(!slot.is_armed());

    settle(5000).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn rearming_replaces_previous_timer() {
    let fired = Arc::new(AtomicUsize::new(0));
    let mut slot = TimerSlot::new();
    for _ in 0..3 {
        let counter = Arc::clone(&fired);
        slot.arm(Duration::from_millis(100), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    settle(200).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(slot.epoch(), 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_slot_cancels_timer() {
    let fired = Arc::new(AtomicUsize::new(0));
    {
        let mut slot = TimerSlot::new();
        let counter = Arc::clone(&fired);
        slot.arm(Duration::from_millis(100), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    settle(500).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
