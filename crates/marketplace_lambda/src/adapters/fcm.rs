//! Firebase Cloud Messaging HTTP v1 adapter.

use std::fmt;

use marketplace_core::listing::PushMessage;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::adapters::push::PushDispatcher;

pub const DEFAULT_FCM_API_BASE: &str = "https://fcm.googleapis.com";

#[derive(Clone, PartialEq, Eq)]
pub struct FcmConfig {
    pub project_id: String,
    pub access_token: String,
    pub api_base: String,
}

impl fmt::Debug for FcmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmConfig")
            .field("project_id", &self.project_id)
            .field("access_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum FcmError {
    #[error("failed to reach push service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("push service rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

pub struct FcmPushDispatcher {
    client: reqwest::Client,
    config: FcmConfig,
}

impl FcmPushDispatcher {
    pub fn new(client: reqwest::Client, config: FcmConfig) -> Self {
        Self { client, config }
    }

    pub async fn send(&self, message: &PushMessage) -> Result<(), FcmError> {
        let response = self
            .client
            .post(fcm_send_url(&self.config))
            .bearer_auth(&self.config.access_token)
            .json(&fcm_request_body(message))
            .send()
            .await?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }

        let body = response.text().await?;
        Err(FcmError::Rejected {
            status,
            message: rejection_message(&body),
        })
    }
}

impl PushDispatcher for FcmPushDispatcher {
    fn send_push(&self, message: &PushMessage) -> Result<(), String> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(self.send(message))
                .map_err(|error| error.to_string())
        })
    }
}

pub fn fcm_send_url(config: &FcmConfig) -> String {
    format!(
        "{}/v1/projects/{}/messages:send",
        config.api_base.trim_end_matches('/'),
        config.project_id
    )
}

pub fn fcm_request_body(message: &PushMessage) -> Value {
    json!({
        "message": {
            "token": message.token,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": message.data,
            "android": {
                "notification": {
                    "click_action": message.click_action,
                },
            },
            "apns": {
                "payload": {
                    "aps": {
                        "category": message.click_action,
                    },
                },
            },
        }
    })
}

fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message.or(envelope.error.status))
        .unwrap_or_else(|| body.trim().to_string())
}
