use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
pub const SALE_NOTIFICATION_TITLE: &str = "Item Sold!";
pub const SALE_NOTIFICATION_TYPE: &str = "listing_sold";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListingStatus {
    Active,
    Sold,
    Other(String),
}

impl From<String> for ListingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "sold" => Self::Sold,
            _ => Self::Other(value),
        }
    }
}

impl From<ListingStatus> for String {
    fn from(value: ListingStatus) -> Self {
        match value {
            ListingStatus::Active => "active".to_string(),
            ListingStatus::Sold => "sold".to_string(),
            ListingStatus::Other(raw) => raw,
        }
    }
}

/// One snapshot of a marketplace listing as seen by the update trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub seller_id: String,
    #[serde(default)]
    pub title: String,
}

impl ListingRecord {
    pub fn is_sold(&self) -> bool {
        matches!(self.status, Some(ListingStatus::Sold))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingUpdate {
    pub listing_id: String,
    pub before: ListingRecord,
    pub after: ListingRecord,
}

impl ListingUpdate {
    pub fn is_sold_transition(&self) -> bool {
        is_sold_transition(&self.before, &self.after)
    }
}

pub fn is_sold_transition(before: &ListingRecord, after: &ListingRecord) -> bool {
    after.is_sold() && !before.is_sold()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    #[serde(default)]
    pub fcm_token: Option<String>,
}

impl UserRecord {
    /// Registered push token, if one is present and non-blank.
    pub fn device_token(&self) -> Option<&str> {
        self.fcm_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

pub fn sale_notification(listing: &ListingRecord) -> NotificationContent {
    let title = listing.title.trim();
    let body = if title.is_empty() {
        "Your item has been sold!".to_string()
    } else {
        format!("Your item \"{title}\" has been sold!")
    };
    NotificationContent {
        title: SALE_NOTIFICATION_TITLE.to_string(),
        body,
    }
}

/// Notification about to be appended; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub listing_id: String,
    pub title: String,
    pub body: String,
    pub read: bool,
}

impl NewNotification {
    pub fn unread(listing_id: impl Into<String>, content: NotificationContent) -> Self {
        Self {
            listing_id: listing_id.into(),
            title: content.title,
            body: content.body,
            read: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub notification_id: String,
    pub listing_id: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub read: bool,
}

impl NotificationRecord {
    pub fn from_new(
        notification_id: impl Into<String>,
        created_at: impl Into<String>,
        notification: &NewNotification,
    ) -> Self {
        Self {
            notification_id: notification_id.into(),
            listing_id: notification.listing_id.clone(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            created_at: created_at.into(),
            read: notification.read,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub click_action: String,
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    pub fn for_sale(
        token: impl Into<String>,
        listing_id: &str,
        content: &NotificationContent,
        click_action: impl Into<String>,
    ) -> Self {
        let click_action = click_action.into();
        Self {
            token: token.into(),
            title: content.title.clone(),
            body: content.body.clone(),
            data: BTreeMap::from([
                ("click_action".to_string(), click_action.clone()),
                ("listingId".to_string(), listing_id.to_string()),
                ("type".to_string(), SALE_NOTIFICATION_TYPE.to_string()),
            ]),
            click_action,
        }
    }
}
