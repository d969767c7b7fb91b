//! Chat support gateway — persona prompt, single-turn model call, transcript.
//!
//! DESIGN
//! ======
//! The model only ever sees the latest user message plus a persona system
//! instruction; history lives in the session transcript for display only.
//! Failures never surface: the user gets a fixed apology instead.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::lock;
use crate::llm::types::{LlmChat, Message, ResponseFormat};

pub const CONNECTION_APOLOGY: &str = "I'm having trouble connecting to the server. Please try again.";
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't process that.";
pub const GREETING: &str = "Hi! I am the Speedride support bot. How can I help you today?";
pub const DEFAULT_CONTEXT: &str = "User is currently using the app.";
/// Messages kept per transcript, greeting included.
pub const MAX_TRANSCRIPT_MESSAGES: usize = 100;

#[must_use]
pub fn build_system_instruction(context: &str) -> String {
    format!(
        "You are a helpful customer support assistant for Speedride, a taxi app. Context: {context}. \
         Keep answers short, friendly, and helpful. If the user asks about a specific ride, ask for the ride ID."
    )
}

pub struct SupportGateway {
    llm: Option<Arc<dyn LlmChat>>,
    max_tokens: u32,
}

impl SupportGateway {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Answer one user message. Never fails.
    pub async fn reply(&self, message: &str, context: &str) -> String {
        let Some(llm) = self.llm.as_ref() else {
            warn!(code = "E_CHAT_NOT_CONFIGURED", "chat: no language model configured");
            return CONNECTION_APOLOGY.to_string();
        };

        let system = build_system_instruction(context);
        let messages = [Message::user(message)];
        match llm.chat(self.max_tokens, &system, &messages, ResponseFormat::Text).await {
            Ok(response) => response.text().unwrap_or_else(|| EMPTY_REPLY.to_string()),
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "chat: model call failed");
                CONNECTION_APOLOGY.to_string()
            }
        }
    }
}

// =============================================================================
// TRANSCRIPT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatAuthor {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatAuthor,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

impl ChatMessage {
    fn new(role: ChatAuthor, text: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), role, text: text.into(), ts: now_ms() }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
}

impl ChatError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "E_CHAT_EMPTY_MESSAGE",
        }
    }
}

/// Per-session conversation shown in the chat widget.
pub struct ChatTranscript {
    messages: Mutex<Vec<ChatMessage>>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    #[must_use]
    pub fn new() -> Self {
        Self { messages: Mutex::new(vec![ChatMessage::new(ChatAuthor::Model, GREETING)]) }
    }

    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.messages).clone()
    }

    /// Append the user's message, ask the gateway, append and return the
    /// reply.
    ///
    /// # Errors
    ///
    /// `EmptyMessage` for blank input; the transcript is left unchanged.
    pub async fn send(&self, gateway: &SupportGateway, message: &str) -> Result<ChatMessage, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        append(&mut lock(&self.messages), ChatMessage::new(ChatAuthor::User, message));
        let text = gateway.reply(message, DEFAULT_CONTEXT).await;
        let reply = ChatMessage::new(ChatAuthor::Model, text);
        let mut messages = lock(&self.messages);
        append(&mut messages, reply.clone());
        info!(messages = messages.len(), "chat: reply appended");
        Ok(reply)
    }
}

/// Push `message`, dropping the oldest messages after the greeting once the
/// transcript is full.
fn append(messages: &mut Vec<ChatMessage>, message: ChatMessage) {
    messages.push(message);
    if messages.len() > MAX_TRANSCRIPT_MESSAGES {
        let excess = messages.len() - MAX_TRANSCRIPT_MESSAGES;
        messages.drain(1..=excess);
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
