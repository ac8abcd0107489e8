pub mod dynamodb;
pub mod fcm;
pub mod payment;
pub mod push;
pub mod record_store;
pub mod stripe;
