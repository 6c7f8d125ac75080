use crate::identity::Caller;
use crate::types::UserRecord;
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

/// Outcome of an access-gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessCheck {
    Allowed,
    Denied,
}

/// Fetch the caller's stored user record.
async fn requester_account(
    client: &DynamoClient,
    table_name: &str,
    email: &str,
) -> Result<Option<UserRecord>, Error> {
    let pk = format!("USER#{}", email);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", aws_sdk_dynamodb::types::AttributeValue::S(pk.clone()))
        .key("SK", aws_sdk_dynamodb::types::AttributeValue::S(pk))
        .send()
        .await?;

    Ok(result.item().map(|item| UserRecord {
        email: item
            .get("email")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        role: item
            .get("role")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string()),
    }))
}

fn decide_owner(account: Option<&UserRecord>, target_email: &str) -> AccessCheck {
    match account {
        Some(account) if account.email == target_email => AccessCheck::Allowed,
        // No stored record, or the record belongs to someone else
        _ => AccessCheck::Denied,
    }
}

fn decide_admin(account: Option<&UserRecord>) -> AccessCheck {
    match account {
        Some(account) if account.role.as_deref() == Some("admin") => AccessCheck::Allowed,
        _ => AccessCheck::Denied,
    }
}

/// Self-scoped read: the caller may only see resources they own.
///
/// Identity verification precedes the store lookup, and the lookup precedes
/// the comparison; anonymous callers never reach the store.
pub async fn check_owner(
    client: &DynamoClient,
    table_name: &str,
    caller: &Caller,
    target_email: &str,
) -> Result<AccessCheck, Error> {
    let email = match caller {
        Caller::Verified { email } => email,
        Caller::Unverified => return Ok(AccessCheck::Denied),
    };

    let account = requester_account(client, table_name, email).await?;
    Ok(decide_owner(account.as_ref(), target_email))
}

/// Role-scoped write: the caller's stored record must carry the admin role.
pub async fn check_admin(
    client: &DynamoClient,
    table_name: &str,
    caller: &Caller,
) -> Result<AccessCheck, Error> {
    let email = match caller {
        Caller::Verified { email } => email,
        Caller::Unverified => return Ok(AccessCheck::Denied),
    };

    let account = requester_account(client, table_name, email).await?;
    Ok(decide_admin(account.as_ref()))
}

/// The response every denied request receives.
pub fn forbidden() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::FORBIDDEN)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"message": "You do not have access"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, role: Option<&str>) -> UserRecord {
        UserRecord {
            email: email.to_string(),
            role: role.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_owner_requires_stored_record() {
        assert_eq!(decide_owner(None, "a@x.com"), AccessCheck::Denied);
    }

    #[test]
    fn test_owner_mismatch_denied() {
        let account = record("a@x.com", None);
        assert_eq!(decide_owner(Some(&account), "b@x.com"), AccessCheck::Denied);
    }

    #[test]
    fn test_owner_match_allowed() {
        let account = record("a@x.com", None);
        assert_eq!(decide_owner(Some(&account), "a@x.com"), AccessCheck::Allowed);
    }

    #[test]
    fn test_admin_requires_stored_record() {
        assert_eq!(decide_admin(None), AccessCheck::Denied);
    }

    #[test]
    fn test_admin_role_absent_denied() {
        let account = record("a@x.com", None);
        assert_eq!(decide_admin(Some(&account)), AccessCheck::Denied);
    }

    #[test]
    fn test_admin_other_role_denied() {
        let account = record("a@x.com", Some("customer"));
        assert_eq!(decide_admin(Some(&account)), AccessCheck::Denied);
    }

    #[test]
    fn test_admin_role_allowed() {
        let account = record("a@x.com", Some("admin"));
        assert_eq!(decide_admin(Some(&account)), AccessCheck::Allowed);
    }

    #[test]
    fn test_forbidden_body() {
        let response = forbidden().unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert_eq!(body, r#"{"message":"You do not have access"}"#);
    }
}
