use marketplace_core::contract::ValidationError;
use thiserror::Error;

/// Every way an intent request can end without a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentFailure {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Method {0} is not allowed")]
    MethodNotAllowed(String),
    #[error("{0}")]
    Processor(String),
    #[error("failed to serialize response: {0}")]
    Serialization(String),
}

impl IntentFailure {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::MethodNotAllowed(_) => 405,
            Self::Processor(_) | Self::Serialization(_) => 500,
        }
    }
}
