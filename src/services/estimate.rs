//! Estimation gateway — pickup/dropoff text → model call → `RideEstimate`.
//!
//! DESIGN
//! ======
//! The model is asked for a bare JSON object in JSON response mode. The
//! reply is parsed strictly: all five fields must be present and valid.
//! Any failure on the way (no model configured, transport, status, empty
//! reply, bad JSON, bad values) degrades to one fixed estimate so the rider
//! flow always advances. No retries, no caching.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::types::{LlmChat, LlmError, Message, ResponseFormat};
use crate::model::RideEstimate;

/// Returned whenever the model path fails.
#[must_use]
pub fn fallback_estimate() -> RideEstimate {
    RideEstimate {
        distance: "3.5 km".into(),
        duration: "12 min".into(),
        price_standard: 12.50,
        price_premium: 18.75,
        price_xl: 25.00,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("no language model configured")]
    NotConfigured,
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("model returned no text")]
    EmptyResponse,
    #[error("estimate is not valid JSON: {0}")]
    Parse(String),
    #[error("estimate rejected: {0}")]
    Invalid(String),
}

impl EstimateError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_ESTIMATE_NOT_CONFIGURED",
            Self::Llm(e) => e.error_code(),
            Self::EmptyResponse => "E_ESTIMATE_EMPTY",
            Self::Parse(_) => "E_ESTIMATE_PARSE",
            Self::Invalid(_) => "E_ESTIMATE_INVALID",
        }
    }
}

#[must_use]
pub fn build_estimate_prompt(pickup: &str, dropoff: &str) -> String {
    format!(
        "Estimate the driving distance, duration, and prices for a taxi ride from \"{pickup}\" to \"{dropoff}\".\n\
         Return ONLY a JSON object with keys: distance (string, e.g. '5.2 km'), duration (string, e.g. '15 min'), priceStandard (number), pricePremium (number), priceXL (number).\n\
         Assume standard pricing is roughly $1.5 per km + $3 base. Premium is 1.5x, XL is 2x."
    )
}

/// Parse and validate a model reply. Markdown code fences around the
/// object are tolerated.
///
/// # Errors
///
/// `Parse` when the text is not a JSON object with the five keys and the
/// right types, `Invalid` when a string is blank or a price is negative or
/// not finite.
pub fn parse_estimate(text: &str) -> Result<RideEstimate, EstimateError> {
    let body = strip_code_fence(text);
    let estimate: RideEstimate = serde_json::from_str(body).map_err(|e| EstimateError::Parse(e.to_string()))?;
    validate(&estimate)?;
    Ok(estimate)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn validate(estimate: &RideEstimate) -> Result<(), EstimateError> {
    if estimate.distance.trim().is_empty() {
        return Err(EstimateError::Invalid("distance is empty".into()));
    }
    if estimate.duration.trim().is_empty() {
        return Err(EstimateError::Invalid("duration is empty".into()));
    }
    for (name, price) in [
        ("priceStandard", estimate.price_standard),
        ("pricePremium", estimate.price_premium),
        ("priceXL", estimate.price_xl),
    ] {
        if !price.is_finite() || price < 0.0 {
            return Err(EstimateError::Invalid(format!("{name} must be a non-negative number, got {price}")));
        }
    }
    Ok(())
}

// =============================================================================
// GATEWAY
// =============================================================================

pub struct EstimationGateway {
    llm: Option<Arc<dyn LlmChat>>,
    max_tokens: u32,
}

impl EstimationGateway {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Estimate via the model, surfacing every failure.
    ///
    /// # Errors
    ///
    /// See [`EstimateError`].
    pub async fn try_estimate(&self, pickup: &str, dropoff: &str) -> Result<RideEstimate, EstimateError> {
        let llm = self.llm.as_ref().ok_or(EstimateError::NotConfigured)?;
        let messages = [Message::user(build_estimate_prompt(pickup, dropoff))];
        let response = llm
            .chat(self.max_tokens, "", &messages, ResponseFormat::Json)
            .await?;
        let text = response.text().ok_or(EstimateError::EmptyResponse)?;
        parse_estimate(&text)
    }

    /// Estimate via the model, falling back to [`fallback_estimate`] on any
    /// failure. Never fails.
    pub async fn estimate(&self, pickup: &str, dropoff: &str) -> RideEstimate {
        match self.try_estimate(pickup, dropoff).await {
            Ok(estimate) => {
                info!(distance = %estimate.distance, duration = %estimate.duration, "estimate: model estimate");
                estimate
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "estimate: using fallback");
                fallback_estimate()
            }
        }
    }
}

#[cfg(test)]
#[path = "estimate_test.rs"]
mod tests;
