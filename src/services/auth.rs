//! Auth stub — role selection resolves to a mock profile after a delay.
//!
//! DESIGN
//! ======
//! There are no credentials. `login(role)` moves the session to `pending`
//! and arms a timer; when it fires the session becomes `authenticated` with
//! the hardcoded profile for that role. `logout` is synchronous and cancels
//! a pending login, so a late timer can never authenticate a session the
//! user already left.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::lock;
use super::timer::TimerSlot;
use crate::model::{DriverProfile, Profile, User, UserRole};

// =============================================================================
// MOCK PROFILES
// =============================================================================

#[must_use]
pub fn mock_rider() -> User {
    User {
        id: "u1".into(),
        name: "John Doe".into(),
        email: "rider@speedride.com".into(),
        role: UserRole::Rider,
        avatar_url: Some("https://picsum.photos/id/1005/100/100".into()),
        rating: Some(4.8),
        wallet_balance: Some(45.50),
    }
}

#[must_use]
pub fn mock_driver() -> DriverProfile {
    DriverProfile {
        user: User {
            id: "d1".into(),
            name: "Sarah Connor".into(),
            email: "driver@speedride.com".into(),
            role: UserRole::Driver,
            avatar_url: Some("https://picsum.photos/id/1027/100/100".into()),
            rating: Some(4.9),
            wallet_balance: None,
        },
        vehicle_model: "Toyota Camry (Black)".into(),
        vehicle_plate: "ABC-1234".into(),
        is_online: false,
        trips_completed: 1420,
        earnings_today: 125.00,
    }
}

#[must_use]
pub fn mock_admin() -> User {
    User {
        id: "a1".into(),
        name: "Admin User".into(),
        email: "admin@speedride.com".into(),
        role: UserRole::Admin,
        avatar_url: Some("https://picsum.photos/id/1011/100/100".into()),
        rating: None,
        wallet_balance: None,
    }
}

#[must_use]
pub fn mock_profile(role: UserRole) -> Profile {
    match role {
        UserRole::Rider => Profile::User(mock_rider()),
        UserRole::Driver => Profile::Driver(mock_driver()),
        UserRole::Admin => Profile::User(mock_admin()),
    }
}

// =============================================================================
// AUTH FLOW
// =============================================================================

/// Session lifecycle: `anonymous → pending → authenticated → anonymous`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AuthState {
    Anonymous,
    Pending { role: UserRole },
    Authenticated { user: Profile },
}

struct AuthInner {
    state: AuthState,
    timer: TimerSlot,
}

pub struct AuthFlow {
    session_id: Uuid,
    login_delay: Duration,
    inner: Arc<Mutex<AuthInner>>,
}

impl AuthFlow {
    #[must_use]
    pub fn new(session_id: Uuid, login_delay: Duration) -> Self {
        Self {
            session_id,
            login_delay,
            inner: Arc::new(Mutex::new(AuthInner { state: AuthState::Anonymous, timer: TimerSlot::new() })),
        }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        lock(&self.inner).state.clone()
    }

    /// The signed-in profile, if the session is authenticated.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        match &lock(&self.inner).state {
            AuthState::Authenticated { user } => Some(user.clone()),
            _ => None,
        }
    }

    /// Begin a login. A second call while pending replaces the role; a call
    /// while authenticated changes nothing.
    pub fn login(&self, role: UserRole) -> AuthState {
        let mut inner = lock(&self.inner);
        if matches!(inner.state, AuthState::Authenticated { .. }) {
            return inner.state.clone();
        }

        inner.state = AuthState::Pending { role };
        let weak = Arc::downgrade(&self.inner);
        let session_id = self.session_id;
        inner
            .timer
            .arm(self.login_delay, move |epoch| complete_login(&weak, epoch, session_id));
        info!(session = %session_id, %role, "auth: login pending");
        inner.state.clone()
    }

    /// Return to anonymous immediately, cancelling any pending login.
    pub fn logout(&self) {
        let mut inner = lock(&self.inner);
        inner.timer.invalidate();
        inner.state = AuthState::Anonymous;
        info!(session = %self.session_id, "auth: logged out");
    }
}

fn complete_login(inner: &Weak<Mutex<AuthInner>>, epoch: u64, session_id: Uuid) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = lock(&inner);
    if !inner.timer.is_current(epoch) {
        return;
    }
    inner.timer.disarm();
    if let AuthState::Pending { role } = inner.state {
        inner.state = AuthState::Authenticated { user: mock_profile(role) };
        info!(session = %session_id, %role, "auth: authenticated");
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
