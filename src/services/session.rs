//! Session store — cookie tokens mapped to per-session flow state.
//!
//! ARCHITECTURE
//! ============
//! A session is created on first login (or first chat message) and owns
//! the auth flow, both ride flows and the chat transcript. Removing it from
//! the store and logging it out cancels every timer it armed. Nothing
//! outlives the process.
//!
//! Sessions idle longer than `session_ttl` are treated as absent and are
//! swept (logged out, removed) lazily on `create` and by the background
//! sweep task.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use super::auth::AuthFlow;
use super::chat::ChatTranscript;
use super::driver::DriverFlow;
use super::lock;
use super::rider::RiderFlow;
use crate::llm::config::env_parse;
use crate::routes::auth::env_bool;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// CONFIG
// =============================================================================

const DEFAULT_LOGIN_DELAY_MS: u64 = 500;
const DEFAULT_DRIVER_REQUEST_DELAY_MS: u64 = 2000;
const DEFAULT_RIDE_MATCH_DELAY_MS: u64 = 3000;
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;

/// Fixed delays that stand in for backend work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub login_delay: Duration,
    pub driver_request_delay: Duration,
    pub ride_match_delay: Duration,
    pub rearm_on_decline: bool,
    /// Idle time after which a session is dropped.
    pub session_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_delay: Duration::from_millis(DEFAULT_LOGIN_DELAY_MS),
            driver_request_delay: Duration::from_millis(DEFAULT_DRIVER_REQUEST_DELAY_MS),
            ride_match_delay: Duration::from_millis(DEFAULT_RIDE_MATCH_DELAY_MS),
            rearm_on_decline: false,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            login_delay: Duration::from_millis(env_parse("LOGIN_DELAY_MS", DEFAULT_LOGIN_DELAY_MS)),
            driver_request_delay: Duration::from_millis(env_parse(
                "DRIVER_REQUEST_DELAY_MS",
                DEFAULT_DRIVER_REQUEST_DELAY_MS,
            )),
            ride_match_delay: Duration::from_millis(env_parse("RIDE_MATCH_DELAY_MS", DEFAULT_RIDE_MATCH_DELAY_MS)),
            rearm_on_decline: env_bool("DRIVER_REARM_ON_DECLINE").unwrap_or(false),
            session_ttl: Duration::from_secs(env_parse("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session {
    /// Log-safe identifier; the cookie token itself is never logged.
    pub id: Uuid,
    pub auth: AuthFlow,
    pub rider: RiderFlow,
    pub driver: DriverFlow,
    pub chat: ChatTranscript,
    last_seen: Mutex<Instant>,
}

impl Session {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            auth: AuthFlow::new(id, config.login_delay),
            rider: RiderFlow::new(id, config.ride_match_delay),
            driver: DriverFlow::new(id, config.driver_request_delay, config.rearm_on_decline),
            chat: ChatTranscript::new(),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// Mark the session as used now.
    pub fn touch(&self) {
        *lock(&self.last_seen) = Instant::now();
    }

    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        lock(&self.last_seen).elapsed() >= ttl
    }

    /// Sign out and reset both ride flows, cancelling their timers.
    pub fn logout(&self) {
        self.auth.logout();
        self.rider.reset();
        self.driver.reset();
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    config: SessionConfig,
}

impl SessionStore {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), config }
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Create a session, returning its cookie token. Expired sessions are
    /// swept first.
    pub async fn create(&self) -> (String, Arc<Session>) {
        let token = generate_token();
        let session = Arc::new(Session::new(self.config));
        let expired = {
            let mut sessions = self.sessions.write().await;
            let expired = take_expired(&mut sessions, self.config.session_ttl);
            sessions.insert(token.clone(), Arc::clone(&session));
            info!(session = %session.id, active = sessions.len(), "session created");
            expired
        };
        retire(&expired);
        (token, session)
    }

    /// Look up a live session and refresh its idle clock. Expired sessions
    /// are absent.
    pub async fn get(&self, token: &str) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.is_expired(self.config.session_ttl) {
            return None;
        }
        session.touch();
        Some(session)
    }

    /// Remove and log out every expired session. Returns how many went.
    pub async fn sweep(&self) -> usize {
        let expired = take_expired(&mut *self.sessions.write().await, self.config.session_ttl);
        retire(&expired);
        expired.len()
    }

    /// Remove and log out a session. Returns it if it existed.
    pub async fn remove(&self, token: &str) -> Option<Arc<Session>> {
        let session = self.sessions.write().await.remove(token)?;
        session.logout();
        info!(session = %session.id, "session removed");
        Some(session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn take_expired(sessions: &mut HashMap<String, Arc<Session>>, ttl: Duration) -> Vec<Arc<Session>> {
    let tokens: Vec<String> = sessions
        .iter()
        .filter(|(_, session)| session.is_expired(ttl))
        .map(|(token, _)| token.clone())
        .collect();
    tokens.iter().filter_map(|token| sessions.remove(token)).collect()
}

fn retire(expired: &[Arc<Session>]) {
    for session in expired {
        session.logout();
        info!(session = %session.id, "session expired");
    }
}

/// Periodically sweep expired sessions.
pub fn spawn_sweep_task(store: SessionStore) -> JoinHandle<()> {
    let sweep_secs = env_parse("SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS).max(1);
    info!(sweep_secs, ttl_secs = store.config.session_ttl.as_secs(), "session sweep configured");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(sweep_secs));
        loop {
            ticker.tick().await;
            store.sweep().await;
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
