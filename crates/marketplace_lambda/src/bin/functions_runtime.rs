use lambda_runtime::{service_fn, Error, LambdaEvent};
use marketplace_lambda::adapters::dynamodb::DynamoRecordStore;
use marketplace_lambda::adapters::fcm::FcmPushDispatcher;
use marketplace_lambda::adapters::push::{NoopPushDispatcher, PushDispatcher};
use marketplace_lambda::adapters::stripe::StripePaymentProcessor;
use marketplace_lambda::config::{IntentCreatorSettings, SaleNotifierSettings};
use marketplace_lambda::handlers::intent::{handle_intent_event, IntentHandlerConfig};
use marketplace_lambda::handlers::sale::{handle_stream_event, SaleNotifierConfig};
use marketplace_lambda::handlers::stream::is_dynamodb_stream_event;
use marketplace_lambda::logging::{init_tracing, RUNTIME_COMPONENT};
use serde_json::{json, Value};

/// Both functions behind one deployable artifact; the event shape decides
/// which handler runs.
struct RuntimeDependencies {
    intent: IntentHandlerConfig,
    processor: StripePaymentProcessor,
    sale: SaleNotifierConfig,
    store: DynamoRecordStore,
    push: Box<dyn PushDispatcher + Send + Sync>,
}

async fn handle_request(event: LambdaEvent<Value>, deps: &RuntimeDependencies) -> Result<Value, Error> {
    if is_dynamodb_stream_event(&event.payload) {
        let outcomes = handle_stream_event(&event.payload, &deps.sale, &deps.store, deps.push.as_ref());
        Ok(json!({ "status": "ok", "outcomes": outcomes }))
    } else {
        let response = handle_intent_event(event.payload, &deps.intent, &deps.processor);
        serde_json::to_value(response)
            .map_err(|error| Error::from(format!("failed to serialize api response: {error}")))
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let intent_settings =
        IntentCreatorSettings::from_env().map_err(|error| Error::from(error.to_string()))?;
    let sale_settings =
        SaleNotifierSettings::from_env().map_err(|error| Error::from(error.to_string()))?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let http_client = reqwest::Client::new();

    let push: Box<dyn PushDispatcher + Send + Sync> = match sale_settings.fcm {
        Some(fcm) => Box::new(FcmPushDispatcher::new(http_client.clone(), fcm)),
        None => {
            tracing::warn!(
                component = RUNTIME_COMPONENT,
                event = "push_disabled",
                "FCM_PROJECT_ID is not configured; push dispatch is disabled"
            );
            Box::new(NoopPushDispatcher)
        }
    };

    let deps = RuntimeDependencies {
        intent: intent_settings.handler,
        processor: StripePaymentProcessor::new(http_client, intent_settings.stripe),
        sale: sale_settings.handler,
        store: DynamoRecordStore::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            sale_settings.users_table,
            sale_settings.notifications_table,
        ),
        push,
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
