#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use marketplace_core::contract::{PaymentIntentParams, PaymentIntentResult};
use marketplace_core::listing::{
    ListingRecord, ListingStatus, ListingUpdate, NewNotification, NotificationRecord,
    PushMessage, UserRecord,
};
use marketplace_core::paths::generated_notification_id;
use marketplace_lambda::adapters::payment::PaymentProcessor;
use marketplace_lambda::adapters::push::PushDispatcher;
use marketplace_lambda::adapters::record_store::{AppendOutcome, NotificationKey, RecordStore};

pub struct RecordingStore {
    users: HashMap<String, UserRecord>,
    notifications: Mutex<Vec<(String, NotificationRecord)>>,
    lookups: Mutex<Vec<String>>,
    fail_lookup: bool,
    fail_write: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            notifications: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
            fail_lookup: false,
            fail_write: false,
        }
    }

    pub fn with_user(mut self, user_id: &str, fcm_token: Option<&str>) -> Self {
        self.users.insert(
            user_id.to_string(),
            UserRecord {
                user_id: user_id.to_string(),
                fcm_token: fcm_token.map(str::to_string),
            },
        );
        self
    }

    pub fn failing_lookup(mut self) -> Self {
        self.fail_lookup = true;
        self
    }

    pub fn failing_write(mut self) -> Self {
        self.fail_write = true;
        self
    }

    pub fn notifications(&self) -> Vec<(String, NotificationRecord)> {
        self.notifications.lock().expect("poisoned mutex").clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("poisoned mutex").clone()
    }
}

impl RecordStore for RecordingStore {
    fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, String> {
        self.lookups
            .lock()
            .expect("poisoned mutex")
            .push(user_id.to_string());
        if self.fail_lookup {
            return Err("simulated lookup failure".to_string());
        }
        Ok(self.users.get(user_id).cloned())
    }

    fn append_notification(
        &self,
        user_id: &str,
        notification: &NewNotification,
        key: &NotificationKey,
    ) -> Result<AppendOutcome, String> {
        if self.fail_write {
            return Err(format!("simulated write failure for user: {user_id}"));
        }

        let mut notifications = self.notifications.lock().expect("poisoned mutex");
        let created_at = format!("2026-02-14T00:00:00.{:06}Z", notifications.len());
        let notification_id = match key {
            NotificationKey::Generated => {
                generated_notification_id(&created_at, &notification.listing_id)
            }
            NotificationKey::Fixed(id) => {
                let exists = notifications
                    .iter()
                    .any(|(owner, record)| owner == user_id && &record.notification_id == id);
                if exists {
                    return Ok(AppendOutcome::AlreadyExists {
                        notification_id: id.clone(),
                    });
                }
                id.clone()
            }
        };

        let record = NotificationRecord::from_new(notification_id, created_at, notification);
        notifications.push((user_id.to_string(), record.clone()));
        Ok(AppendOutcome::Created(record))
    }
}

pub struct RecordingPush {
    messages: Mutex<Vec<PushMessage>>,
    fail: bool,
}

impl RecordingPush {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<PushMessage> {
        self.messages.lock().expect("poisoned mutex").clone()
    }
}

impl PushDispatcher for RecordingPush {
    fn send_push(&self, message: &PushMessage) -> Result<(), String> {
        self.messages
            .lock()
            .expect("poisoned mutex")
            .push(message.clone());
        if self.fail {
            return Err("simulated push failure".to_string());
        }
        Ok(())
    }
}

pub struct CountingProcessor {
    calls: Mutex<Vec<PaymentIntentParams>>,
    outcome: Result<PaymentIntentResult, String>,
}

impl CountingProcessor {
    pub fn returning(client_secret: &str, payment_intent_id: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Ok(PaymentIntentResult {
                client_secret: client_secret.to_string(),
                payment_intent_id: payment_intent_id.to_string(),
            }),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Err(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<PaymentIntentParams> {
        self.calls.lock().expect("poisoned mutex").clone()
    }
}

impl PaymentProcessor for CountingProcessor {
    fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> Result<PaymentIntentResult, String> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(params.clone());
        self.outcome.clone()
    }
}

pub fn listing(status: Option<&str>, seller_id: &str, title: &str) -> ListingRecord {
    ListingRecord {
        status: status.map(|value| ListingStatus::from(value.to_string())),
        seller_id: seller_id.to_string(),
        title: title.to_string(),
    }
}

pub fn update(listing_id: &str, before: Option<&str>, after: Option<&str>) -> ListingUpdate {
    ListingUpdate {
        listing_id: listing_id.to_string(),
        before: listing(before, "seller-1", "Vintage lamp"),
        after: listing(after, "seller-1", "Vintage lamp"),
    }
}
