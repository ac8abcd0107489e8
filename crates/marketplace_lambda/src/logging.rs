use tracing_subscriber::EnvFilter;

pub const INTENT_COMPONENT: &str = "intent_creator";
pub const SALE_COMPONENT: &str = "sale_notifier";
pub const RUNTIME_COMPONENT: &str = "functions_runtime";

const DEFAULT_FILTER: &str = "info";

/// Installs the JSON subscriber used by every Lambda binary.
///
/// Honors `RUST_LOG`; a second call is a no-op.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(false)
        .try_init();
}
