use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use marketplace_core::contract::{
    normalize_payment_request, ErrorBody, PaymentRequest, ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::adapters::payment::PaymentProcessor;
use crate::error::IntentFailure;
use crate::logging::INTENT_COMPONENT;

pub const DEFAULT_ALLOW_ORIGIN: &str = "*";
pub const ALLOWED_METHODS: &str = "POST";
pub const ALLOWED_HEADERS: &str = "Content-Type";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
}

impl ApiGatewayResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(Value::as_str)
    }

    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentHandlerConfig {
    pub allow_origin: String,
}

impl Default for IntentHandlerConfig {
    fn default() -> Self {
        Self {
            allow_origin: DEFAULT_ALLOW_ORIGIN.to_string(),
        }
    }
}

pub fn handle_intent_event(
    event: Value,
    config: &IntentHandlerConfig,
    processor: &dyn PaymentProcessor,
) -> ApiGatewayResponse {
    let method = request_method(&event);
    if method == "OPTIONS" {
        return preflight_response(config);
    }

    match create_intent(event, &method, processor) {
        Ok(body) => json_response(200, body, config),
        Err(failure) => failure_response(&failure, config),
    }
}

fn create_intent(
    event: Value,
    method: &str,
    processor: &dyn PaymentProcessor,
) -> Result<String, IntentFailure> {
    if method != "POST" {
        return Err(IntentFailure::MethodNotAllowed(method.to_string()));
    }

    let payload = request_body(event).map_err(ValidationError::Malformed)?;
    // Arrays would otherwise deserialize positionally into the request fields.
    if !payload.is_object() {
        return Err(ValidationError::MissingFields.into());
    }
    let request = serde_json::from_value::<PaymentRequest>(payload)
        .map_err(|error| ValidationError::Malformed(error.to_string()))?;
    let params = normalize_payment_request(&request)?;

    let intent = processor.create_payment_intent(&params).map_err(|message| {
        error!(
            component = INTENT_COMPONENT,
            event = "intent_failed",
            amount = params.amount,
            currency = %params.currency,
            error = %message
        );
        IntentFailure::Processor(message)
    })?;

    info!(
        component = INTENT_COMPONENT,
        event = "intent_created",
        payment_intent_id = %intent.payment_intent_id,
        amount = params.amount,
        currency = %params.currency
    );

    serde_json::to_string(&intent).map_err(|error| IntentFailure::Serialization(error.to_string()))
}

/// Uppercased HTTP method of a REST (v1) or HTTP API (v2) proxy event.
///
/// Direct invocations without any method are treated as `POST`.
pub fn request_method(event: &Value) -> String {
    event
        .get("httpMethod")
        .and_then(Value::as_str)
        .or_else(|| {
            event
                .pointer("/requestContext/http/method")
                .and_then(Value::as_str)
        })
        .unwrap_or("POST")
        .to_ascii_uppercase()
}

fn request_body(event: Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("payload must be a JSON object".to_string());
    };

    let Some(body) = object.get("body") else {
        if object.contains_key("httpMethod") || object.contains_key("requestContext") {
            return Ok(json!({}));
        }
        return Ok(event);
    };

    let encoded = object
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    match body {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) if encoded => {
            let bytes = BASE64
                .decode(text.trim())
                .map_err(|error| format!("body is not valid base64: {error}"))?;
            parse_json_body(&bytes)
        }
        Value::String(text) if text.trim().is_empty() => Ok(json!({})),
        Value::String(text) => parse_json_body(text.as_bytes()),
        _ => Err("body must be a JSON object".to_string()),
    }
}

fn parse_json_body(bytes: &[u8]) -> Result<Value, String> {
    serde_json::from_slice(bytes).map_err(|error| format!("body is not valid JSON: {error}"))
}

fn cors_headers(config: &IntentHandlerConfig) -> Map<String, Value> {
    let mut headers = Map::new();
    headers.insert(
        "Access-Control-Allow-Origin".to_string(),
        Value::from(config.allow_origin.clone()),
    );
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        Value::from(ALLOWED_METHODS),
    );
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        Value::from(ALLOWED_HEADERS),
    );
    headers
}

fn preflight_response(config: &IntentHandlerConfig) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: 204,
        headers: Value::Object(cors_headers(config)),
        body: String::new(),
        is_base64_encoded: false,
    }
}

fn json_response(status_code: u16, body: String, config: &IntentHandlerConfig) -> ApiGatewayResponse {
    let mut headers = cors_headers(config);
    headers.insert(
        "Content-Type".to_string(),
        Value::from("application/json"),
    );
    ApiGatewayResponse {
        status_code,
        headers: Value::Object(headers),
        body,
        is_base64_encoded: false,
    }
}

fn failure_response(failure: &IntentFailure, config: &IntentHandlerConfig) -> ApiGatewayResponse {
    if let IntentFailure::Validation(reason) = failure {
        warn!(
            component = INTENT_COMPONENT,
            event = "request_rejected",
            reason = %reason
        );
    }

    let body = serde_json::to_string(&ErrorBody::new(failure.to_string()))
        .expect("error body should serialize");
    let mut response = json_response(failure.status_code(), body, config);
    if matches!(failure, IntentFailure::MethodNotAllowed(_)) {
        if let Value::Object(headers) = &mut response.headers {
            headers.insert("Allow".to_string(), Value::from("POST, OPTIONS"));
        }
    }
    response
}
