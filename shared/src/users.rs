use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::store;
use crate::types::{AdminStatusResponse, MakeAdminRequest};

/// Store a user profile on first sign-in. Users are keyed by email.
pub async fn create_user(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let doc: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to parse user body: {}", e);
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({"error": format!("Invalid request body: {}", e)})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };
    let (fields, email) = match doc.as_object() {
        Some(fields) => match fields.get("email").and_then(|v| v.as_str()) {
            Some(email) => (fields, email.to_string()),
            None => {
                return Ok(Response::builder()
                    .status(StatusCode::BAD_REQUEST)
                    .header("Content-Type", "application/json")
                    .header("Access-Control-Allow-Origin", "*")
                    .body(
                        serde_json::json!({"error": "User must carry an email"})
                            .to_string()
                            .into(),
                    )
                    .map_err(Box::new)?);
            }
        },
        None => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({"error": "User must be a JSON object"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let now = chrono::Utc::now().to_rfc3339();
    let pk = format!("USER#{}", email);

    let mut item = store::document_to_item(&pk, fields);
    item.insert(
        "created_at".to_string(),
        aws_sdk_dynamodb::types::AttributeValue::S(now.clone()),
    );

    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(item))
        .send()
        .await?;

    tracing::info!("User profile stored for {}", email);

    let mut stored = fields.clone();
    stored.insert("_id".to_string(), serde_json::Value::String(email));
    stored.insert("created_at".to_string(), serde_json::Value::String(now));

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&stored)?.into())
        .map_err(Box::new)?)
}

/// Upsert a user profile by email, writing whatever fields the client sent.
pub async fn upsert_user(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let doc: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to parse user body: {}", e);
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({"error": format!("Invalid request body: {}", e)})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };
    let (fields, email) = match doc.as_object() {
        Some(fields) => match fields.get("email").and_then(|v| v.as_str()) {
            Some(email) => (fields, email.to_string()),
            None => {
                return Ok(Response::builder()
                    .status(StatusCode::BAD_REQUEST)
                    .header("Content-Type", "application/json")
                    .header("Access-Control-Allow-Origin", "*")
                    .body(
                        serde_json::json!({"error": "User must carry an email"})
                            .to_string()
                            .into(),
                    )
                    .map_err(Box::new)?);
            }
        },
        None => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({"error": "User must be a JSON object"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let pk = format!("USER#{}", email);

    let mut update_expr = vec![];
    let mut expr_names = std::collections::HashMap::new();
    let mut expr_values = std::collections::HashMap::new();

    for (i, (key, value)) in fields.iter().enumerate() {
        if key == "PK" || key == "SK" || key == "_id" {
            continue;
        }
        update_expr.push(format!("#f{} = :v{}", i, i));
        expr_names.insert(format!("#f{}", i), key.clone());
        expr_values.insert(format!(":v{}", i), store::attr_from_json(value));
    }

    if !update_expr.is_empty() {
        let mut builder = client
            .update_item()
            .table_name(table_name)
            .key("PK", aws_sdk_dynamodb::types::AttributeValue::S(pk.clone()))
            .key("SK", aws_sdk_dynamodb::types::AttributeValue::S(pk))
            .update_expression(format!("SET {}", update_expr.join(", ")));

        for (k, v) in expr_names {
            builder = builder.expression_attribute_names(k, v);
        }

        for (k, v) in expr_values {
            builder = builder.expression_attribute_values(k, v);
        }

        builder.send().await?;
    }

    tracing::info!("User profile upserted for {}", email);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"acknowledged": true})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

/// Grant the admin role to the user named in the body.
///
/// Reached only after the role-scoped access gate allowed the caller. The
/// write is conditional on the target existing; an unknown email reports
/// `modified: 0` instead of creating a record.
pub async fn make_admin(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: MakeAdminRequest = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to parse admin grant: {}", e);
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({"error": format!("Invalid request body: {}", e)})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let pk = format!("USER#{}", req.email);

    let result = client
        .update_item()
        .table_name(table_name)
        .key("PK", aws_sdk_dynamodb::types::AttributeValue::S(pk.clone()))
        .key("SK", aws_sdk_dynamodb::types::AttributeValue::S(pk))
        .update_expression("SET #role = :admin")
        .condition_expression("attribute_exists(PK)")
        .expression_attribute_names("#role", "role")
        .expression_attribute_values(
            ":admin",
            aws_sdk_dynamodb::types::AttributeValue::S("admin".to_string()),
        )
        .send()
        .await;

    match result {
        Ok(_) => {
            tracing::info!("Granted admin role to {}", req.email);
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({"acknowledged": true, "modified": 1})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?)
        }
        Err(e) => {
            let service_error = e.into_service_error();
            if service_error.is_conditional_check_failed_exception() {
                // Unknown target user; report a no-op rather than creating
                // a record that holds nothing but a role.
                tracing::warn!("Admin grant for unknown user {}", req.email);
                Ok(Response::builder()
                    .status(StatusCode::OK)
                    .header("Content-Type", "application/json")
                    .header("Access-Control-Allow-Origin", "*")
                    .body(
                        serde_json::json!({"acknowledged": true, "modified": 0})
                            .to_string()
                            .into(),
                    )
                    .map_err(Box::new)?)
            } else {
                Err(Box::new(service_error))
            }
        }
    }
}

/// Report whether the stored record for an email carries the admin role.
pub async fn admin_status(
    client: &DynamoClient,
    table_name: &str,
    email: &str,
) -> Result<Response<Body>, Error> {
    let pk = format!("USER#{}", email);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", aws_sdk_dynamodb::types::AttributeValue::S(pk.clone()))
        .key("SK", aws_sdk_dynamodb::types::AttributeValue::S(pk))
        .send()
        .await?;

    let admin = result
        .item()
        .and_then(|item| item.get("role"))
        .and_then(|v| v.as_s().ok())
        .map(|role| role == "admin")
        .unwrap_or(false);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&AdminStatusResponse { admin })?.into())
        .map_err(Box::new)?)
}
