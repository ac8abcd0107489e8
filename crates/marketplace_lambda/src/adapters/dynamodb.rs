use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{SecondsFormat, Utc};
use marketplace_core::listing::{NewNotification, NotificationRecord, UserRecord};
use marketplace_core::paths::generated_notification_id;
use thiserror::Error;

use crate::adapters::record_store::{AppendOutcome, NotificationKey, RecordStore};

pub const USER_ID_ATTRIBUTE: &str = "userId";
pub const NOTIFICATION_ID_ATTRIBUTE: &str = "notificationId";
pub const FCM_TOKEN_ATTRIBUTE: &str = "fcmToken";

#[derive(Debug, Error)]
pub enum DynamoStoreError {
    #[error("failed to read user {user_id}: {message}")]
    ReadUser { user_id: String, message: String },
    #[error("failed to write notification {notification_id} for user {user_id}: {message}")]
    WriteNotification {
        user_id: String,
        notification_id: String,
        message: String,
    },
}

/// Users live in one table keyed by `userId`; the per-user notification
/// collection is a second table keyed by `userId` + `notificationId`.
pub struct DynamoRecordStore {
    client: aws_sdk_dynamodb::Client,
    users_table: String,
    notifications_table: String,
}

impl DynamoRecordStore {
    pub fn new(
        client: aws_sdk_dynamodb::Client,
        users_table: impl Into<String>,
        notifications_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            users_table: users_table.into(),
            notifications_table: notifications_table.into(),
        }
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<Option<UserRecord>, DynamoStoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.users_table)
            .key(USER_ID_ATTRIBUTE, AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|error| DynamoStoreError::ReadUser {
                user_id: user_id.to_string(),
                message: DisplayErrorContext(&error).to_string(),
            })?;

        Ok(output.item().map(|item| user_from_item(user_id, item)))
    }

    pub async fn put_notification(
        &self,
        user_id: &str,
        notification: &NewNotification,
        key: &NotificationKey,
    ) -> Result<AppendOutcome, DynamoStoreError> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let notification_id = match key {
            NotificationKey::Generated => {
                generated_notification_id(&created_at, &notification.listing_id)
            }
            NotificationKey::Fixed(id) => id.clone(),
        };
        let record = NotificationRecord::from_new(notification_id.clone(), created_at, notification);

        let mut request = self
            .client
            .put_item()
            .table_name(&self.notifications_table)
            .set_item(Some(notification_item(user_id, &record)));
        if matches!(key, NotificationKey::Fixed(_)) {
            request = request
                .condition_expression("attribute_not_exists(#notification_id)")
                .expression_attribute_names("#notification_id", NOTIFICATION_ID_ATTRIBUTE);
        }

        match request.send().await {
            Ok(_) => Ok(AppendOutcome::Created(record)),
            Err(error)
                if error
                    .as_service_error()
                    .map(|service_error| service_error.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Ok(AppendOutcome::AlreadyExists { notification_id })
            }
            Err(error) => Err(DynamoStoreError::WriteNotification {
                user_id: user_id.to_string(),
                notification_id,
                message: DisplayErrorContext(&error).to_string(),
            }),
        }
    }
}

impl RecordStore for DynamoRecordStore {
    fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, String> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(self.fetch_user(user_id))
                .map_err(|error| error.to_string())
        })
    }

    fn append_notification(
        &self,
        user_id: &str,
        notification: &NewNotification,
        key: &NotificationKey,
    ) -> Result<AppendOutcome, String> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(self.put_notification(user_id, notification, key))
                .map_err(|error| error.to_string())
        })
    }
}

pub fn user_from_item(user_id: &str, item: &HashMap<String, AttributeValue>) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        fcm_token: item
            .get(FCM_TOKEN_ATTRIBUTE)
            .and_then(|value| value.as_s().ok())
            .cloned(),
    }
}

pub fn notification_item(
    user_id: &str,
    record: &NotificationRecord,
) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            USER_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(user_id.to_string()),
        ),
        (
            NOTIFICATION_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(record.notification_id.clone()),
        ),
        (
            "listingId".to_string(),
            AttributeValue::S(record.listing_id.clone()),
        ),
        ("title".to_string(), AttributeValue::S(record.title.clone())),
        ("body".to_string(), AttributeValue::S(record.body.clone())),
        (
            "createdAt".to_string(),
            AttributeValue::S(record.created_at.clone()),
        ),
        ("read".to_string(), AttributeValue::Bool(record.read)),
    ])
}
