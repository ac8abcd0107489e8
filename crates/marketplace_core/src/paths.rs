use sha2::{Digest, Sha256};

pub const LISTINGS_COLLECTION: &str = "marketplace_listings";
pub const USERS_COLLECTION: &str = "users";
pub const NOTIFICATIONS_COLLECTION: &str = "notifications";

const LISTING_NOTIFICATION_ID_PREFIX: &str = "sold-";
const LISTING_NOTIFICATION_HASH_LEN: usize = 32;

pub fn listing_document_path(listing_id: &str) -> String {
    format!("{LISTINGS_COLLECTION}/{listing_id}")
}

pub fn user_document_path(user_id: &str) -> String {
    format!("{USERS_COLLECTION}/{user_id}")
}

pub fn notifications_collection_path(user_id: &str) -> String {
    format!("{}/{NOTIFICATIONS_COLLECTION}", user_document_path(user_id))
}

pub fn notification_document_path(user_id: &str, notification_id: &str) -> String {
    format!("{}/{notification_id}", notifications_collection_path(user_id))
}

/// Id for a notification appended without an idempotency key.
///
/// Sorts by creation time inside a seller's collection; a redelivered event
/// gets a new timestamp and therefore a new record.
pub fn generated_notification_id(created_at: &str, listing_id: &str) -> String {
    format!("{created_at}#{listing_id}")
}

/// Deterministic id for the sold notification of one listing.
pub fn listing_notification_id(seller_id: &str, listing_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seller_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(listing_id.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!(
        "{LISTING_NOTIFICATION_ID_PREFIX}{}",
        &digest[..LISTING_NOTIFICATION_HASH_LEN]
    )
}
