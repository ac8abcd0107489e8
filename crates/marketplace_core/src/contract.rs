use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const CURRENCY_CODE_LEN: usize = 3;

/// Inbound body of a payment intent request.
///
/// Both fields are kept as raw JSON so that missing and falsy values
/// (`null`, `false`, `0`, `""`) can be told apart from wrongly typed ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    #[serde(default)]
    pub amount: Value,
    #[serde(default)]
    pub currency: Value,
}

/// Validated parameters handed to the payment processor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentIntentParams {
    /// Amount in the currency's minor unit.
    pub amount: u64,
    /// Lowercase ISO 4217 code.
    pub currency: String,
    pub automatic_payment_methods: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResult {
    pub client_secret: String,
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing amount or currency")]
    MissingFields,
    #[error("amount must be a number")]
    AmountNotNumeric,
    #[error("amount must round to a positive integer")]
    AmountNotPositive,
    #[error("currency must be a three-letter ISO code")]
    InvalidCurrency,
    #[error("Malformed request: {0}")]
    Malformed(String),
}

/// Rejects anything Stripe would refuse (non-numeric or sub-unit amounts,
/// non-ISO currencies) as a client error before the processor is called.
pub fn normalize_payment_request(
    request: &PaymentRequest,
) -> Result<PaymentIntentParams, ValidationError> {
    if is_falsy(&request.amount) || is_falsy(&request.currency) {
        return Err(ValidationError::MissingFields);
    }

    let amount = match &request.amount {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
    .ok_or(ValidationError::AmountNotNumeric)?;

    let rounded = round_half_up(amount);
    if rounded < 1.0 || rounded > u64::MAX as f64 {
        return Err(ValidationError::AmountNotPositive);
    }

    let currency = match &request.currency {
        Value::String(text) => normalize_currency(text)?,
        _ => return Err(ValidationError::InvalidCurrency),
    };

    Ok(PaymentIntentParams {
        amount: rounded as u64,
        currency,
        automatic_payment_methods: true,
    })
}

/// Rounds to the nearest integer with halves going towards positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn normalize_currency(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim();
    if code.len() != CURRENCY_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidCurrency);
    }
    Ok(code.to_ascii_lowercase())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().map(|v| v == 0.0).unwrap_or(false),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
