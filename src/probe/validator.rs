//! Inbound message classification.
//!
//! # Responsibilities
//! - Recognize a subscription confirmation
//! - Recognize a price update carrying the full quote field set
//!
//! # Design Decisions
//! - Pure functions over raw text; no session state
//! - Malformed JSON is `NotMatched`, never an error: other event types share
//!   the channel and are expected
//! - Quote fields are checked for presence only; `"N/A"` values still match

use serde_json::{Map, Value};

/// Discriminator of a subscription confirmation.
pub const SUBSCRIPTION_STATUS_EVENT: &str = "subscription_status";
/// Discriminator of a price update.
pub const PRICE_UPDATE_EVENT: &str = "price_update";
/// Sentinel the endpoint sends for a quote field it has no value for.
pub const UNAVAILABLE: &str = "N/A";
/// Fields every price update must carry.
pub const REQUIRED_SAMPLE_FIELDS: [&str; 4] =
    ["ask_price", "bid_price", "last_sale_price", "delta_indicator"];

/// Quote fields extracted from a price update. Values are kept as received.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub ticker: Option<String>,
    pub ask_price: Value,
    pub bid_price: Value,
    pub last_sale_price: Value,
    pub delta_indicator: Value,
}

/// Classification of one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Confirmed { ticker: String },
    DataSample(PriceSample),
    NotMatched,
}

impl ValidationResult {
    pub fn is_match(&self) -> bool {
        !matches!(self, ValidationResult::NotMatched)
    }
}

/// Classify a message as a subscription confirmation.
pub fn validate_subscription_confirmation(raw: &str) -> ValidationResult {
    let Some(data) = event_data(raw, SUBSCRIPTION_STATUS_EVENT) else {
        return ValidationResult::NotMatched;
    };

    let subscribed = data.get("status").and_then(Value::as_str) == Some("subscribed");
    let ticker = data
        .get("ticker")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty());

    match (subscribed, ticker) {
        (true, Some(ticker)) => ValidationResult::Confirmed {
            ticker: ticker.to_string(),
        },
        _ => ValidationResult::NotMatched,
    }
}

/// Classify a message as a price update sample.
pub fn validate_price_sample(raw: &str) -> ValidationResult {
    let Some(data) = event_data(raw, PRICE_UPDATE_EVENT) else {
        return ValidationResult::NotMatched;
    };

    if !REQUIRED_SAMPLE_FIELDS.iter().all(|f| data.contains_key(*f)) {
        return ValidationResult::NotMatched;
    }

    let field = |name: &str| data.get(name).cloned().unwrap_or(Value::Null);
    ValidationResult::DataSample(PriceSample {
        ticker: data.get("ticker").and_then(Value::as_str).map(str::to_string),
        ask_price: field("ask_price"),
        bid_price: field("bid_price"),
        last_sale_price: field("last_sale_price"),
        delta_indicator: field("delta_indicator"),
    })
}

/// Try every known classification in order.
pub fn classify(raw: &str) -> ValidationResult {
    match validate_subscription_confirmation(raw) {
        ValidationResult::NotMatched => validate_price_sample(raw),
        confirmed => confirmed,
    }
}

/// Parse `raw` and return its `data` object when `event` equals `expected`.
fn event_data(raw: &str, expected: &str) -> Option<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let mut object = match value {
        Value::Object(object) => object,
        _ => return None,
    };
    if object.get("event").and_then(Value::as_str) != Some(expected) {
        return None;
    }
    match object.remove("data") {
        Some(Value::Object(data)) => Some(data),
        _ => None,
    }
}
