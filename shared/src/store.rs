use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Convert a JSON value into a DynamoDB attribute.
pub fn attr_from_json(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(attr_from_json).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), attr_from_json(v)))
                .collect(),
        ),
    }
}

/// Convert a DynamoDB attribute back into a JSON value.
pub fn json_from_attr(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => n
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| n.parse::<f64>().map(Value::from))
            .unwrap_or_else(|_| Value::String(n.clone())),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(items.iter().map(json_from_attr).collect()),
        AttributeValue::M(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), json_from_attr(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

/// Build the item for a document stored under `PK = SK = <prefix><id>`.
pub fn document_to_item(pk: &str, fields: &Map<String, Value>) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("PK".to_string(), AttributeValue::S(pk.to_string()));
    item.insert("SK".to_string(), AttributeValue::S(pk.to_string()));
    for (key, value) in fields {
        if key == "PK" || key == "SK" || key == "_id" {
            continue;
        }
        item.insert(key.clone(), attr_from_json(value));
    }
    item
}

/// Read a stored item back as the document that was sent, with the generated
/// id surfaced as `_id`.
pub fn item_to_document(item: &HashMap<String, AttributeValue>) -> Value {
    let mut fields = Map::new();
    for (key, value) in item {
        if key == "PK" || key == "SK" {
            continue;
        }
        fields.insert(key.clone(), json_from_attr(value));
    }
    if let Some(id) = item
        .get("PK")
        .and_then(|v| v.as_s().ok())
        .and_then(|pk| pk.split_once('#'))
        .map(|(_, id)| id)
    {
        fields.insert("_id".to_string(), Value::String(id.to_string()));
    }
    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_to_item_keys() {
        let doc = json!({"title": "Mavic Mini", "price": 399, "inStock": true});
        let item = document_to_item("PRODUCT#abc", doc.as_object().unwrap());
        assert_eq!(item.get("PK").unwrap().as_s().unwrap(), "PRODUCT#abc");
        assert_eq!(item.get("SK").unwrap().as_s().unwrap(), "PRODUCT#abc");
        assert_eq!(item.get("title").unwrap().as_s().unwrap(), "Mavic Mini");
        assert_eq!(item.get("price").unwrap().as_n().unwrap(), "399");
        assert_eq!(*item.get("inStock").unwrap().as_bool().unwrap(), true);
    }

    #[test]
    fn test_item_to_document_surfaces_id() {
        let doc = json!({"email": "a@x.com", "status": "pending"});
        let item = document_to_item("ORDER#o-1", doc.as_object().unwrap());
        let restored = item_to_document(&item);
        assert_eq!(restored["_id"], "o-1");
        assert_eq!(restored["email"], "a@x.com");
        assert_eq!(restored["status"], "pending");
        assert!(restored.get("PK").is_none());
    }

    #[test]
    fn test_nested_document_survives() {
        let doc = json!({"address": {"city": "Dhaka", "zip": 1207}, "items": ["x500", "x700"]});
        let item = document_to_item("ORDER#o-2", doc.as_object().unwrap());
        let restored = item_to_document(&item);
        assert_eq!(restored["address"]["city"], "Dhaka");
        assert_eq!(restored["address"]["zip"], 1207);
        assert_eq!(restored["items"][1], "x700");
    }
}
