mod llm;
mod model;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::llm::config::{DEFAULT_LLM_MAX_TOKENS, env_parse};
use crate::services::session::{SessionConfig, spawn_sweep_task};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = env_parse("PORT", 3000);

    // Initialize LLM client (non-fatal: gateways serve their fallbacks if config missing).
    let (llm, max_tokens): (Option<Arc<dyn LlmChat>>, u32) = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            let max_tokens = client.max_tokens();
            (Some(Arc::new(client) as Arc<dyn LlmChat>), max_tokens)
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), "LLM client not configured; using fallback estimates and replies");
            (None, DEFAULT_LLM_MAX_TOKENS)
        }
    };

    let config = SessionConfig::from_env();
    tracing::info!(
        login_delay_ms = config.login_delay.as_millis(),
        driver_request_delay_ms = config.driver_request_delay.as_millis(),
        ride_match_delay_ms = config.ride_match_delay.as_millis(),
        rearm_on_decline = config.rearm_on_decline,
        session_ttl_secs = config.session_ttl.as_secs(),
        "session timings"
    );
    let state = state::AppState::new(config, llm, max_tokens);
    let _sweep = spawn_sweep_task(state.sessions.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "speedride listening");
    axum::serve(listener, app).await.expect("server failed");
}
