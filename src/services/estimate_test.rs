use super::*;
use crate::state::test_helpers::MockLlm;

fn gateway(mock: &Arc<MockLlm>) -> EstimationGateway {
    EstimationGateway::new(Some(Arc::clone(mock) as Arc<dyn LlmChat>), 256)
}

const GOOD_REPLY: &str =
    r#"{"distance":"5.2 km","duration":"15 min","priceStandard":10.8,"pricePremium":16.2,"priceXL":21.6}"#;

// =============================================================================
// prompt
// =============================================================================

#[test]
fn prompt_quotes_both_addresses() {
    let prompt = build_estimate_prompt("JFK Terminal 4", "Times Square");
    assert!(prompt.starts_with(
        "Estimate the driving distance, duration, and prices for a taxi ride from \"JFK Terminal 4\" to \"Times Square\".\n"
    ));
    assert!(prompt.contains("priceStandard (number), pricePremium (number), priceXL (number)."));
    assert!(prompt.ends_with("Premium is 1.5x, XL is 2x."));
    assert_eq!(prompt.lines().count(), 3);
}

// =============================================================================
// parse_estimate
// =============================================================================

#[test]
fn parse_plain_object() {
    let estimate = parse_estimate(GOOD_REPLY).unwrap();
    assert_eq!(estimate.distance, "5.2 km");
    assert_eq!(estimate.duration, "15 min");
    assert!((estimate.price_xl - 21.6).abs() < f64::EPSILON);
}

#[test]
fn parse_fenced_object() {
    let text = format!("```json\n{GOOD_REPLY}\n```\n");
    assert_eq!(parse_estimate(&text).unwrap().price_standard, 10.8);

    let bare_fence = format!("```\n{GOOD_REPLY}```");
    assert_eq!(parse_estimate(&bare_fence).unwrap().price_premium, 16.2);
}

#[test]
fn parse_accepts_integer_prices_and_extra_keys() {
    let text = r#"{"distance":"1 km","duration":"3 min","priceStandard":5,"pricePremium":8,"priceXL":10,"currency":"USD"}"#;
    let estimate = parse_estimate(text).unwrap();
    assert_eq!(estimate.price_standard, 5.0);
}

#[test]
fn parse_rejects_missing_field() {
    let text = r#"{"distance":"1 km","duration":"3 min","priceStandard":5,"pricePremium":8}"#;
    assert!(matches!(parse_estimate(text), Err(EstimateError::Parse(_))));
}

#[test]
fn parse_rejects_prices_as_strings() {
    let text = r#"{"distance":"1 km","duration":"3 min","priceStandard":"5","pricePremium":8,"priceXL":10}"#;
    assert!(matches!(parse_estimate(text), Err(EstimateError::Parse(_))));
}

#[test]
fn parse_rejects_prose() {
    let err = parse_estimate("I cannot estimate that ride.").unwrap_err();
    assert_eq!(err.error_code(), "E_ESTIMATE_PARSE");
}

#[test]
fn parse_rejects_negative_price() {
    let text = r#"{"distance":"1 km","duration":"3 min","priceStandard":-1,"pricePremium":8,"priceXL":10}"#;
    let err = parse_estimate(text).unwrap_err();
    assert!(matches!(err, EstimateError::Invalid(ref msg) if msg.contains("priceStandard")));
}

#[test]
fn parse_rejects_blank_distance() {
    let text = r#"{"distance":"  ","duration":"3 min","priceStandard":1,"pricePremium":8,"priceXL":10}"#;
    assert_eq!(parse_estimate(text).unwrap_err().error_code(), "E_ESTIMATE_INVALID");
}

// =============================================================================
// gateway
// =============================================================================

#[tokio::test]
async fn estimate_uses_model_reply() {
    let mock = Arc::new(MockLlm::replying(GOOD_REPLY));
    let estimate = gateway(&mock).estimate("A", "B").await;
    assert_eq!(estimate.distance, "5.2 km");

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].format, ResponseFormat::Json);
    assert_eq!(calls[0].max_tokens, 256);
    assert_eq!(calls[0].messages.len(), 1);
    assert!(calls[0].messages[0].content.contains("from \"A\" to \"B\""));
}

#[tokio::test]
async fn estimate_falls_back_without_model() {
    let gateway = EstimationGateway::new(None, 256);
    assert!(matches!(gateway.try_estimate("A", "B").await, Err(EstimateError::NotConfigured)));
    assert_eq!(gateway.estimate("A", "B").await, fallback_estimate());
}

#[tokio::test]
async fn estimate_falls_back_on_model_error() {
    let mock = Arc::new(MockLlm::failing());
    let gateway = gateway(&mock);
    assert!(matches!(gateway.try_estimate("A", "B").await, Err(EstimateError::Llm(_))));
    assert_eq!(gateway.estimate("A", "B").await, fallback_estimate());
}

#[tokio::test]
async fn estimate_falls_back_on_empty_reply() {
    let mock = Arc::new(MockLlm::empty());
    let gateway = gateway(&mock);
    assert!(matches!(gateway.try_estimate("A", "B").await, Err(EstimateError::EmptyResponse)));
    assert_eq!(gateway.estimate("A", "B").await, fallback_estimate());
}

#[tokio::test]
async fn estimate_falls_back_on_garbage() {
    let mock = Arc::new(MockLlm::replying("{\"distance\": 4}"));
    assert_eq!(gateway(&mock).estimate("A", "B").await, fallback_estimate());
}

#[test]
fn fallback_values_are_fixed() {
    let fallback = fallback_estimate();
    assert_eq!(fallback.distance, "3.5 km");
    assert_eq!(fallback.duration, "12 min");
    assert_eq!(fallback.price_standard, 12.50);
    assert_eq!(fallback.price_premium, 18.75);
    assert_eq!(fallback.price_xl, 25.00);
}
