use droneza_shared::{access, feedbacks, identity, orders, products, users, AppState};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use std::env;
use std::sync::Arc;

/// Main Lambda handler - routes requests to store and auth-gated endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET,POST,PUT,DELETE,OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "droneza".to_string());
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, parts.as_slice()) {
        (&Method::GET, []) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .body("Hello World".into())
            .map_err(Box::new)?),

        // --- ORDERS ---
        // GET /my-order?email= - orders for the signed-in user
        (&Method::GET, ["my-order"]) => {
            let caller = identity::resolve_caller(&state.cognito_client, event.headers()).await;
            let email = event
                .query_string_parameters_ref()
                .and_then(|params| params.first("email"))
                .unwrap_or("");

            match access::check_owner(&state.dynamo_client, &table_name, &caller, email).await? {
                access::AccessCheck::Allowed => {
                    orders::my_orders(&state.dynamo_client, &table_name, email).await
                }
                access::AccessCheck::Denied => access::forbidden(),
            }
        }
        // POST /orders - place an order
        (&Method::POST, ["orders"]) => {
            orders::create_order(&state.dynamo_client, &table_name, body).await
        }
        // GET /orders - list all orders
        (&Method::GET, ["orders"]) => orders::list_orders(&state.dynamo_client, &table_name).await,
        // PUT /orders/{id} - accept an order
        (&Method::PUT, ["orders", order_id]) => {
            orders::accept_order(&state.dynamo_client, &table_name, order_id).await
        }
        // DELETE /orders/{id} - delete an order
        (&Method::DELETE, ["orders", order_id]) => {
            orders::delete_order(&state.dynamo_client, &table_name, order_id).await
        }

        // --- PRODUCTS ---
        // POST /products - save a product
        (&Method::POST, ["products"]) => {
            products::create_product(&state.dynamo_client, &table_name, body).await
        }
        // GET /products - list the catalog
        (&Method::GET, ["products"]) => {
            products::list_products(&state.dynamo_client, &table_name).await
        }
        // GET /product/{id} - fetch one product
        (&Method::GET, ["product", product_id]) => {
            products::get_product(&state.dynamo_client, &table_name, product_id).await
        }
        // PUT /products/{id} - update a product
        (&Method::PUT, ["products", product_id]) => {
            products::update_product(&state.dynamo_client, &table_name, product_id, body).await
        }
        // DELETE /products/{id} - delete a product
        (&Method::DELETE, ["products", product_id]) => {
            products::delete_product(&state.dynamo_client, &table_name, product_id).await
        }

        // --- FEEDBACKS ---
        // POST /feedbacks - store feedback
        (&Method::POST, ["feedbacks"]) => {
            feedbacks::create_feedback(&state.dynamo_client, &table_name, body).await
        }
        // GET /feedbacks - list feedbacks
        (&Method::GET, ["feedbacks"]) => {
            feedbacks::list_feedbacks(&state.dynamo_client, &table_name).await
        }

        // --- USERS ---
        // PUT /users/admin - promote a user (stored admin role required)
        (&Method::PUT, ["users", "admin"]) => {
            let caller = identity::resolve_caller(&state.cognito_client, event.headers()).await;

            match access::check_admin(&state.dynamo_client, &table_name, &caller).await? {
                access::AccessCheck::Allowed => {
                    users::make_admin(&state.dynamo_client, &table_name, body).await
                }
                access::AccessCheck::Denied => access::forbidden(),
            }
        }
        // POST /users - store a user profile
        (&Method::POST, ["users"]) => {
            users::create_user(&state.dynamo_client, &table_name, body).await
        }
        // PUT /users - upsert a user profile
        (&Method::PUT, ["users"]) => {
            users::upsert_user(&state.dynamo_client, &table_name, body).await
        }
        // GET /users/{email} - admin flag for an email
        (&Method::GET, ["users", email]) => {
            users::admin_status(&state.dynamo_client, &table_name, email).await
        }

        _ => {
            tracing::warn!("No route matched - Method: {} Path: {}", method, path);
            not_found()
        }
    }
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http;

    // Clients built from bare configs never send anything in these tests:
    // every exercised path returns before the first SDK call.
    fn test_state() -> Arc<AppState> {
        let cognito_config = aws_sdk_cognitoidentityprovider::Config::builder()
            .behavior_version(aws_sdk_cognitoidentityprovider::config::BehaviorVersion::latest())
            .build();
        let dynamo_config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .build();
        AppState::new(
            aws_sdk_cognitoidentityprovider::Client::from_conf(cognito_config),
            aws_sdk_dynamodb::Client::from_conf(dynamo_config),
        )
    }

    fn request(method: Method, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::Empty)
            .unwrap()
    }

    #[tokio::test]
    async fn test_greeting() {
        let response = function_handler(request(Method::GET, "/"), test_state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            String::from_utf8(response.body().to_vec()).unwrap(),
            "Hello World"
        );
    }

    #[tokio::test]
    async fn test_my_order_without_credential_is_forbidden() {
        let response = function_handler(
            request(Method::GET, "/my-order?email=a@x.com"),
            test_state(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            String::from_utf8(response.body().to_vec()).unwrap(),
            r#"{"message":"You do not have access"}"#
        );
    }

    #[tokio::test]
    async fn test_make_admin_without_credential_is_forbidden() {
        let response = function_handler(request(Method::PUT, "/users/admin"), test_state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            String::from_utf8(response.body().to_vec()).unwrap(),
            r#"{"message":"You do not have access"}"#
        );
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = function_handler(request(Method::OPTIONS, "/orders"), test_state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = function_handler(request(Method::GET, "/unknown"), test_state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
