use aws_config::timeout::TimeoutConfig;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use droneza_shared::AppState;
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;
use std::time::Duration;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Initialize AWS clients once at startup. The timeouts bound every
    // identity-provider and store call.
    let timeouts = TimeoutConfig::builder()
        .operation_timeout(Duration::from_secs(10))
        .operation_attempt_timeout(Duration::from_secs(5))
        .build();
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .timeout_config(timeouts)
        .load()
        .await;

    let state = AppState::new(CognitoClient::new(&config), DynamoClient::new(&config));

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
