//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the session flows and the model gateways so route
//! handlers can stay focused on protocol translation and auth plumbing.
//! Flow state sits behind `std::sync::Mutex`; guards are never held across
//! an `.await`.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod driver;
pub mod estimate;
pub mod rider;
pub mod session;
pub mod timer;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a flow mutex. Flow state stays consistent across a panicking
/// holder, so poisoning is ignored.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
