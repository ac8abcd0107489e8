use marketplace_core::listing::PushMessage;

pub trait PushDispatcher {
    fn send_push(&self, message: &PushMessage) -> Result<(), String>;
}

/// Dispatcher used when no push backend is configured; every send is a no-op.
pub struct NoopPushDispatcher;

impl PushDispatcher for NoopPushDispatcher {
    fn send_push(&self, _message: &PushMessage) -> Result<(), String> {
        Ok(())
    }
}
