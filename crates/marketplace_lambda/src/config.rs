//! Environment configuration for the Lambda binaries.
//!
//! Settings are resolved once at cold start and handed to handlers
//! explicitly. Every loader has a `from_lookup` twin so tests can supply
//! variables without touching the process environment.

use marketplace_core::listing::DEFAULT_CLICK_ACTION;
use thiserror::Error;

use crate::adapters::fcm::{FcmConfig, DEFAULT_FCM_API_BASE};
use crate::adapters::stripe::{StripeConfig, DEFAULT_STRIPE_API_BASE};
use crate::handlers::intent::{IntentHandlerConfig, DEFAULT_ALLOW_ORIGIN};
use crate::handlers::sale::{IdempotencyMode, SaleNotifierConfig};

pub const STRIPE_SECRET_KEY: &str = "STRIPE_SECRET_KEY";
pub const STRIPE_API_BASE: &str = "STRIPE_API_BASE";
pub const CORS_ALLOW_ORIGIN: &str = "CORS_ALLOW_ORIGIN";
pub const USERS_TABLE: &str = "USERS_TABLE";
pub const NOTIFICATIONS_TABLE: &str = "NOTIFICATIONS_TABLE";
pub const FCM_PROJECT_ID: &str = "FCM_PROJECT_ID";
pub const FCM_ACCESS_TOKEN: &str = "FCM_ACCESS_TOKEN";
pub const FCM_API_BASE: &str = "FCM_API_BASE";
pub const NOTIFICATION_CLICK_ACTION: &str = "NOTIFICATION_CLICK_ACTION";
pub const NOTIFICATION_IDEMPOTENCY: &str = "NOTIFICATION_IDEMPOTENCY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentCreatorSettings {
    pub stripe: StripeConfig,
    pub handler: IntentHandlerConfig,
}

impl IntentCreatorSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            stripe: StripeConfig {
                secret_key: required(&lookup, STRIPE_SECRET_KEY)?,
                api_base: optional(&lookup, STRIPE_API_BASE)
                    .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
            },
            handler: IntentHandlerConfig {
                allow_origin: optional(&lookup, CORS_ALLOW_ORIGIN)
                    .unwrap_or_else(|| DEFAULT_ALLOW_ORIGIN.to_string()),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleNotifierSettings {
    pub users_table: String,
    pub notifications_table: String,
    /// `None` disables push dispatch; records are still written.
    pub fcm: Option<FcmConfig>,
    pub handler: SaleNotifierConfig,
}

impl SaleNotifierSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let fcm = match optional(&lookup, FCM_PROJECT_ID) {
            Some(project_id) => Some(FcmConfig {
                project_id,
                access_token: required(&lookup, FCM_ACCESS_TOKEN)?,
                api_base: optional(&lookup, FCM_API_BASE)
                    .unwrap_or_else(|| DEFAULT_FCM_API_BASE.to_string()),
            }),
            None => None,
        };

        let idempotency = match optional(&lookup, NOTIFICATION_IDEMPOTENCY) {
            Some(raw) => raw
                .parse::<IdempotencyMode>()
                .map_err(|reason| ConfigError::Invalid {
                    name: NOTIFICATION_IDEMPOTENCY,
                    reason,
                })?,
            None => IdempotencyMode::default(),
        };

        Ok(Self {
            users_table: required(&lookup, USERS_TABLE)?,
            notifications_table: required(&lookup, NOTIFICATIONS_TABLE)?,
            fcm,
            handler: SaleNotifierConfig {
                click_action: optional(&lookup, NOTIFICATION_CLICK_ACTION)
                    .unwrap_or_else(|| DEFAULT_CLICK_ACTION.to_string()),
                idempotency,
            },
        })
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}
