//! Chat routes — support transcript and message send.
//!
//! Available without signing in; the first message creates a session so the
//! transcript survives across requests.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::auth::{SessionCtx, ensure_session};
use super::error::ApiError;
use crate::services::chat::{ChatError, ChatMessage, ChatTranscript};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendRequest {
    pub message: String,
}

/// `GET /api/chat` — the caller's transcript, or just the greeting.
pub async fn transcript(ctx: SessionCtx) -> Json<Vec<ChatMessage>> {
    let messages = match ctx.session {
        Some(session) => session.chat.messages(),
        None => ChatTranscript::new().messages(),
    };
    Json(messages)
}

/// `POST /api/chat` — send a message and return the support reply.
pub async fn send(State(state): State<AppState>, ctx: SessionCtx, Json(req): Json<SendRequest>) -> Response {
    if req.message.trim().is_empty() {
        return ApiError::from(ChatError::EmptyMessage).into_response();
    }
    let (jar, session) = ensure_session(&state, ctx).await;
    match session.chat.send(&state.support, &req.message).await {
        Ok(reply) => (jar, Json(reply)).into_response(),
        Err(e) => (jar, ApiError::from(e)).into_response(),
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
