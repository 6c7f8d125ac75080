use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::store;
use crate::types::UpdateProductRequest;

/// Save a new product to the catalog.
pub async fn create_product(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let doc: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to parse product body: {}", e);
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
                    serde_json::json!({"error": "Product must be a JSON object"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let product_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let pk = format!("PRODUCT#{}", product_id);

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
    stored.insert("_id".to_string(), serde_json::Value::String(product_id));
    stored.insert("created_at".to_string(), serde_json::Value::String(now));

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&stored)?.into())
        .map_err(Box::new)?)
}

/// List the whole catalog.
pub async fn list_products(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, Error> {
    let result = client
        .scan()
        .table_name(table_name)
        .filter_expression("begins_with(PK, :prefix)")
        .expression_attribute_values(
            ":prefix",
            aws_sdk_dynamodb::types::AttributeValue::S("PRODUCT#".to_string()),
        )
        .send()
        .await?;

    let products: Vec<serde_json::Value> =
        result.items().iter().map(store::item_to_document).collect();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&products)?.into())
        .map_err(Box::new)?)
}

/// Fetch one product by id.
pub async fn get_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Response<Body>, Error> {
    let pk = format!("PRODUCT#{}", product_id);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", aws_sdk_dynamodb::types::AttributeValue::S(pk.clone()))
        .key("SK", aws_sdk_dynamodb::types::AttributeValue::S(pk))
        .send()
        .await?;

    if let Some(item) = result.item() {
        let product = store::item_to_document(item);
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&product)?.into())
            .map_err(Box::new)?)
    } else {
        Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(
                serde_json::json!({"error": "Product not found"})
                    .to_string()
                    .into(),
            )
            .map_err(Box::new)?)
    }
}

/// Overwrite the listed product fields. The write goes through whether or
/// not the id already exists.
pub async fn update_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: UpdateProductRequest = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to parse product update: {}", e);
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
    let pk = format!("PRODUCT#{}", product_id);

    let mut update_expr = vec![];
    let mut expr_names = std::collections::HashMap::new();
    let mut expr_values = std::collections::HashMap::new();

    // "desc" and "title" are reserved words, so every field goes through a
    // name placeholder.
    let fields = [
        ("image", req.image),
        ("title", req.title),
        ("price", req.price),
        ("desc", req.desc),
        ("rating", req.rating),
        ("reviews", req.reviews),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            update_expr.push(format!("#{} = :{}", name, name));
            expr_names.insert(format!("#{}", name), name.to_string());
            expr_values.insert(format!(":{}", name), store::attr_from_json(&value));
        }
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

    get_product(client, table_name, product_id).await
}

/// Delete a product by id.
pub async fn delete_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Response<Body>, Error> {
    let pk = format!("PRODUCT#{}", product_id);

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
