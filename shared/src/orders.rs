use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::store;

/// Store a new order document as sent by the client.
pub async fn create_order(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let doc: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to parse order body: {}", e);
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
    let fields = match doc.as_object() {
        Some(fields) => fields,
        None => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({"error": "Order must be a JSON object"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let order_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let pk = format!("ORDER#{}", order_id);

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

    tracing::info!("Order {} stored", order_id);

    let mut stored = fields.clone();
    stored.insert("_id".to_string(), serde_json::Value::String(order_id));
    stored.insert("created_at".to_string(), serde_json::Value::String(now));

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&stored)?.into())
        .map_err(Box::new)?)
}

/// List every stored order.
pub async fn list_orders(client: &DynamoClient, table_name: &str) -> Result<Response<Body>, Error> {
    let result = client
        .scan()
        .table_name(table_name)
        .filter_expression("begins_with(PK, :prefix)")
        .expression_attribute_values(
            ":prefix",
            aws_sdk_dynamodb::types::AttributeValue::S("ORDER#".to_string()),
        )
        .send()
        .await?;

    let orders: Vec<serde_json::Value> =
        result.items().iter().map(store::item_to_document).collect();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&orders)?.into())
        .map_err(Box::new)?)
}

/// List the orders placed under one email.
///
/// Reached only after the access gate allowed the read for that email.
pub async fn my_orders(
    client: &DynamoClient,
    table_name: &str,
    email: &str,
) -> Result<Response<Body>, Error> {
    let result = client
        .scan()
        .table_name(table_name)
        .filter_expression("begins_with(PK, :prefix) AND email = :email")
        .expression_attribute_values(
            ":prefix",
            aws_sdk_dynamodb::types::AttributeValue::S("ORDER#".to_string()),
        )
        .expression_attribute_values(
            ":email",
            aws_sdk_dynamodb::types::AttributeValue::S(email.to_string()),
        )
        .send()
        .await?;

    let orders: Vec<serde_json::Value> =
        result.items().iter().map(store::item_to_document).collect();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&orders)?.into())
        .map_err(Box::new)?)
}

/// Mark an order accepted. The write goes through whether or not the id
/// already exists.
pub async fn accept_order(
    client: &DynamoClient,
    table_name: &str,
    order_id: &str,
) -> Result<Response<Body>, Error> {
    let pk = format!("ORDER#{}", order_id);

    client
        .update_item()
        .table_name(table_name)
        .key("PK", aws_sdk_dynamodb::types::AttributeValue::S(pk.clone()))
        .key("SK", aws_sdk_dynamodb::types::AttributeValue::S(pk))
        .update_expression("SET #status = :accepted")
        .expression_attribute_names("#status", "status")
        .expression_attribute_values(
            ":accepted",
            aws_sdk_dynamodb::types::AttributeValue::S("accepted".to_string()),
        )
        .send()
        .await?;

    tracing::info!("Order {} accepted", order_id);

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

/// Delete an order by id.
pub async fn delete_order(
    client: &DynamoClient,
    table_name: &str,
    order_id: &str,
) -> Result<Response<Body>, Error> {
    let pk = format!("ORDER#{}", order_id);

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", aws_sdk_dynamodb::types::AttributeValue::S(pk.clone()))
        .key("SK", aws_sdk_dynamodb::types::AttributeValue::S(pk))
        .send()
        .await?;

    Ok(Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Empty)
        .map_err(Box::new)?)
}
