use lambda_runtime::{service_fn, Error, LambdaEvent};
use marketplace_lambda::adapters::stripe::StripePaymentProcessor;
use marketplace_lambda::config::IntentCreatorSettings;
use marketplace_lambda::handlers::intent::{
    handle_intent_event, ApiGatewayResponse, IntentHandlerConfig,
};
use marketplace_lambda::logging::init_tracing;
use serde_json::Value;

struct RuntimeDependencies {
    handler: IntentHandlerConfig,
    processor: StripePaymentProcessor,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_intent_event(
        event.payload,
        &deps.handler,
        &deps.processor,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let settings = IntentCreatorSettings::from_env().map_err(|error| Error::from(error.to_string()))?;
    let deps = RuntimeDependencies {
        handler: settings.handler,
        processor: StripePaymentProcessor::new(reqwest::Client::new(), settings.stripe),
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
