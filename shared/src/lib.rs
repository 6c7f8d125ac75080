pub mod types;
pub mod identity;
pub mod access;
pub mod store;
pub mod users;
pub mod products;
pub mod orders;
pub mod feedbacks;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub cognito_client: CognitoClient,
    pub dynamo_client: DynamoClient,
}

impl AppState {
    pub fn new(cognito_client: CognitoClient, dynamo_client: DynamoClient) -> Arc<Self> {
        Arc::new(Self {
            cognito_client,
            dynamo_client,
        })
    }
}
