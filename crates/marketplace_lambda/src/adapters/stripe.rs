//! Stripe payment intent adapter.
//!
//! Talks to `POST /v1/payment_intents` with a form-encoded body and bearer
//! authentication. Non-2xx responses are surfaced with Stripe's own
//! `error.message` so that callers can pass it through unchanged.

use std::fmt;

use marketplace_core::contract::{PaymentIntentParams, PaymentIntentResult};
use serde::Deserialize;
use thiserror::Error;

use crate::adapters::payment::PaymentProcessor;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Clone, PartialEq, Eq)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("failed to reach payment processor: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected payment processor response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Deserialize)]
struct PaymentIntentBody {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub struct StripePaymentProcessor {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripePaymentProcessor {
    pub fn new(client: reqwest::Client, config: StripeConfig) -> Self {
        Self { client, config }
    }

    pub async fn create(
        &self,
        params: &PaymentIntentParams,
    ) -> Result<PaymentIntentResult, StripeError> {
        let response = self
            .client
            .post(payment_intents_url(&self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .form(&payment_intent_form(params))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_payment_intent_response(status, &body)
    }
}

impl PaymentProcessor for StripePaymentProcessor {
    fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> Result<PaymentIntentResult, String> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(self.create(params))
                .map_err(|error| error.to_string())
        })
    }
}

pub fn payment_intents_url(api_base: &str) -> String {
    format!("{}/v1/payment_intents", api_base.trim_end_matches('/'))
}

pub fn payment_intent_form(params: &PaymentIntentParams) -> Vec<(&'static str, String)> {
    vec![
        ("amount", params.amount.to_string()),
        ("currency", params.currency.clone()),
        (
            "automatic_payment_methods[enabled]",
            params.automatic_payment_methods.to_string(),
        ),
    ]
}

pub fn parse_payment_intent_response(
    status: u16,
    body: &str,
) -> Result<PaymentIntentResult, StripeError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error.message.or(envelope.error.kind))
            .unwrap_or_else(|| format!("payment processor responded with status {status}"));
        return Err(StripeError::Rejected { status, message });
    }

    let intent: PaymentIntentBody = serde_json::from_str(body)
        .map_err(|error| StripeError::UnexpectedResponse(error.to_string()))?;
    let client_secret = intent.client_secret.ok_or_else(|| {
        StripeError::UnexpectedResponse(format!("payment intent {} has no client_secret", intent.id))
    })?;

    Ok(PaymentIntentResult {
        client_secret,
        payment_intent_id: intent.id,
    })
}
