use std::str::FromStr;

use marketplace_core::listing::{
    sale_notification, ListingUpdate, NewNotification, PushMessage, DEFAULT_CLICK_ACTION,
};
use marketplace_core::paths::{
    listing_document_path, listing_notification_id, notification_document_path,
    notifications_collection_path,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::adapters::push::PushDispatcher;
use crate::adapters::record_store::{AppendOutcome, NotificationKey, RecordStore};
use crate::handlers::stream::decode_listing_updates;
use crate::logging::SALE_COMPONENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdempotencyMode {
    /// Every delivery appends a new record.
    #[default]
    Off,
    /// One record per seller and listing; redeliveries are dropped.
    Listing,
}

impl FromStr for IdempotencyMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Ok(Self::Off),
            "listing" => Ok(Self::Listing),
            other => Err(format!("unsupported idempotency mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleNotifierConfig {
    pub click_action: String,
    pub idempotency: IdempotencyMode,
}

impl Default for SaleNotifierConfig {
    fn default() -> Self {
        Self {
            click_action: DEFAULT_CLICK_ACTION.to_string(),
            idempotency: IdempotencyMode::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Decode,
    SellerLookup,
    NotificationWrite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PushOutcome {
    Sent,
    SkippedNoToken,
    Failed { message: String },
}

/// What happened to one listing update. Never an error for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaleOutcome {
    NotSoldTransition,
    MissingSellerId {
        listing_id: String,
    },
    SellerNotFound {
        listing_id: String,
        seller_id: String,
    },
    AlreadyNotified {
        listing_id: String,
        seller_id: String,
        notification_id: String,
    },
    Notified {
        listing_id: String,
        seller_id: String,
        notification_id: String,
        push: PushOutcome,
    },
    Failed {
        stage: FailureStage,
        message: String,
    },
}

pub fn handle_listing_update(
    update: &ListingUpdate,
    config: &SaleNotifierConfig,
    store: &dyn RecordStore,
    push: &dyn PushDispatcher,
) -> SaleOutcome {
    if !update.is_sold_transition() {
        debug!(
            component = SALE_COMPONENT,
            event = "not_sold_transition",
            listing = %listing_document_path(&update.listing_id)
        );
        return SaleOutcome::NotSoldTransition;
    }

    let listing_id = update.listing_id.clone();
    let seller_id = update.after.seller_id.clone();
    if seller_id.trim().is_empty() {
        warn!(
            component = SALE_COMPONENT,
            event = "seller_id_missing",
            listing = %listing_document_path(&listing_id)
        );
        return SaleOutcome::MissingSellerId { listing_id };
    }

    let seller = match store.get_user(&seller_id) {
        Ok(Some(seller)) => seller,
        Ok(None) => {
            info!(
                component = SALE_COMPONENT,
                event = "seller_missing",
                listing_id = %listing_id,
                seller_id = %seller_id
            );
            return SaleOutcome::SellerNotFound {
                listing_id,
                seller_id,
            };
        }
        Err(message) => return failed(FailureStage::SellerLookup, &listing_id, message),
    };

    let content = sale_notification(&update.after);
    let notification = NewNotification::unread(listing_id.clone(), content.clone());
    let key = match config.idempotency {
        IdempotencyMode::Off => NotificationKey::Generated,
        IdempotencyMode::Listing => {
            NotificationKey::Fixed(listing_notification_id(&seller_id, &listing_id))
        }
    };

    let notification_id = match store.append_notification(&seller_id, &notification, &key) {
        Ok(AppendOutcome::Created(record)) => {
            info!(
                component = SALE_COMPONENT,
                event = "notification_written",
                listing_id = %listing_id,
                document = %notification_document_path(&seller_id, &record.notification_id)
            );
            record.notification_id
        }
        Ok(AppendOutcome::AlreadyExists { notification_id }) => {
            info!(
                component = SALE_COMPONENT,
                event = "notification_exists",
                listing_id = %listing_id,
                collection = %notifications_collection_path(&seller_id),
                notification_id = %notification_id
            );
            return SaleOutcome::AlreadyNotified {
                listing_id,
                seller_id,
                notification_id,
            };
        }
        Err(message) => return failed(FailureStage::NotificationWrite, &listing_id, message),
    };

    let push_outcome = match seller.device_token() {
        None => {
            debug!(
                component = SALE_COMPONENT,
                event = "push_skipped",
                listing_id = %listing_id,
                seller_id = %seller_id
            );
            PushOutcome::SkippedNoToken
        }
        Some(token) => {
            let message = PushMessage::for_sale(token, &listing_id, &content, &config.click_action);
            match push.send_push(&message) {
                Ok(()) => {
                    info!(
                        component = SALE_COMPONENT,
                        event = "push_sent",
                        listing_id = %listing_id,
                        seller_id = %seller_id
                    );
                    PushOutcome::Sent
                }
                Err(message) => {
                    error!(
                        component = SALE_COMPONENT,
                        event = "push_failed",
                        listing_id = %listing_id,
                        seller_id = %seller_id,
                        error = %message
                    );
                    PushOutcome::Failed { message }
                }
            }
        }
    };

    SaleOutcome::Notified {
        listing_id,
        seller_id,
        notification_id,
        push: push_outcome,
    }
}

/// Processes every listing update carried by a DynamoDB stream event in order.
pub fn handle_stream_event(
    event: &Value,
    config: &SaleNotifierConfig,
    store: &dyn RecordStore,
    push: &dyn PushDispatcher,
) -> Vec<SaleOutcome> {
    let records = match decode_listing_updates(event) {
        Ok(records) => records,
        Err(message) => return vec![failed(FailureStage::Decode, "-", message)],
    };

    records
        .into_iter()
        .map(|record| match record {
            Ok(Some(update)) => handle_listing_update(&update, config, store, push),
            Ok(None) => SaleOutcome::NotSoldTransition,
            Err(message) => failed(FailureStage::Decode, "-", message),
        })
        .collect()
}

fn failed(stage: FailureStage, listing_id: &str, message: String) -> SaleOutcome {
    error!(
        component = SALE_COMPONENT,
        event = "sale_notification_failed",
        stage = ?stage,
        listing_id = %listing_id,
        error = %message
    );
    SaleOutcome::Failed { stage, message }
}
