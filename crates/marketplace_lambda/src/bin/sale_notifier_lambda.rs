use lambda_runtime::{service_fn, Error, LambdaEvent};
use marketplace_lambda::adapters::dynamodb::DynamoRecordStore;
use marketplace_lambda::adapters::fcm::FcmPushDispatcher;
use marketplace_lambda::adapters::push::{NoopPushDispatcher, PushDispatcher};
use marketplace_lambda::config::SaleNotifierSettings;
use marketplace_lambda::handlers::sale::{handle_stream_event, SaleNotifierConfig};
use marketplace_lambda::logging::{init_tracing, SALE_COMPONENT};
use serde_json::{json, Value};

struct RuntimeDependencies {
    handler: SaleNotifierConfig,
    store: DynamoRecordStore,
    push: Box<dyn PushDispatcher + Send + Sync>,
}

async fn handle_request(event: LambdaEvent<Value>, deps: &RuntimeDependencies) -> Result<Value, Error> {
    let outcomes = handle_stream_event(
        &event.payload,
        &deps.handler,
        &deps.store,
        deps.push.as_ref(),
    );
    Ok(json!({ "status": "ok", "outcomes": outcomes }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let settings = SaleNotifierSettings::from_env().map_err(|error| Error::from(error.to_string()))?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let push: Box<dyn PushDispatcher + Send + Sync> = match settings.fcm {
        Some(fcm) => Box::new(FcmPushDispatcher::new(reqwest::Client::new(), fcm)),
        None => {
            tracing::warn!(
                component = SALE_COMPONENT,
                event = "push_disabled",
                "FCM_PROJECT_ID is not configured; push dispatch is disabled"
            );
            Box::new(NoopPushDispatcher)
        }
    };

    let deps = RuntimeDependencies {
        handler: settings.handler,
        store: DynamoRecordStore::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            settings.users_table,
            settings.notifications_table,
        ),
        push,
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
