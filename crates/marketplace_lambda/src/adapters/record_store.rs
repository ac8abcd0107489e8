use marketplace_core::listing::{NewNotification, NotificationRecord, UserRecord};

/// How the store should identify an appended notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKey {
    /// Store-generated id; every append creates a new record.
    Generated,
    /// Caller-supplied id; the append is skipped if the id already exists.
    Fixed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Created(NotificationRecord),
    AlreadyExists { notification_id: String },
}

pub trait RecordStore {
    fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, String>;

    /// Appends to `users/{user_id}/notifications`, assigning `createdAt`.
    fn append_notification(
        &self,
        user_id: &str,
        notification: &NewNotification,
        key: &NotificationKey,
    ) -> Result<AppendOutcome, String>;
}
