//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the session store and the two model gateways. Both gateways
//! share one optional LLM client; with none configured they serve their
//! fallbacks.

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::services::chat::SupportGateway;
use crate::services::estimate::EstimationGateway;
use crate::services::session::{SessionConfig, SessionStore};

/// Shared application state. Clone is required by Axum; all inner fields
/// are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub estimator: Arc<EstimationGateway>,
    pub support: Arc<SupportGateway>,
}

impl AppState {
    #[must_use]
    pub fn new(config: SessionConfig, llm: Option<Arc<dyn LlmChat>>, max_tokens: u32) -> Self {
        Self {
            sessions: SessionStore::new(config),
            estimator: Arc::new(EstimationGateway::new(llm.clone(), max_tokens)),
            support: Arc::new(SupportGateway::new(llm, max_tokens)),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
