pub mod intent;
pub mod sale;
pub mod stream;
