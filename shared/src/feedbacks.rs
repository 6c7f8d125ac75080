use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::store;

/// Store a feedback document as sent by the client.
pub async fn create_feedback(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let doc: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to parse feedback body: {}", e);
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
                    serde_json::json!({"error": "Feedback must be a JSON object"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let feedback_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let pk = format!("FEEDBACK#{}", feedback_id);

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

    let mut stored = fields.clone();
    stored.insert("_id".to_string(), serde_json::Value::String(feedback_id));
    stored.insert("created_at".to_string(), serde_json::Value::String(now));

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&stored)?.into())
        .map_err(Box::new)?)
}

/// List every stored feedback.
pub async fn list_feedbacks(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, Error> {
    let result = client
        .scan()
        .table_name(table_name)
        .filter_expression("begins_with(PK, :prefix)")
        .expression_attribute_values(
            ":prefix",
            aws_sdk_dynamodb::types::AttributeValue::S("FEEDBACK#".to_string()),
        )
        .send()
        .await?;

    let feedbacks: Vec<serde_json::Value> =
        result.items().iter().map(store::item_to_document).collect();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&feedbacks)?.into())
        .map_err(Box::new)?)
}
