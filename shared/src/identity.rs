use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use lambda_http::http::HeaderMap;

/// Outcome of credential verification for one request.
///
/// Verification never aborts a request. A missing, malformed, or rejected
/// credential downgrades the caller to `Unverified` and the access gate
/// decides what an anonymous caller may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Verified { email: String },
    Unverified,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the caller identity from the Authorization header.
///
/// The bearer token is presented to Cognito and the verified `email`
/// attribute becomes the caller identity. A missing or malformed header
/// skips the provider call entirely.
pub async fn resolve_caller(cognito_client: &CognitoClient, headers: &HeaderMap) -> Caller {
    let token = match bearer_token(headers) {
        Some(token) => token,
        None => return Caller::Unverified,
    };

    match cognito_client.get_user().access_token(token).send().await {
        Ok(output) => {
            let email = output
                .user_attributes()
                .iter()
                .find(|attr| attr.name() == "email")
                .and_then(|attr| attr.value())
                .map(|s| s.to_string());

            match email {
                Some(email) => Caller::Verified { email },
                None => {
                    tracing::warn!("Verified token carries no email attribute");
                    Caller::Unverified
                }
            }
        }
        Err(e) => {
            // The request proceeds anonymous; this log line is the only
            // trace of a rejected token or an unreachable provider.
            tracing::warn!("Token verification failed, treating caller as anonymous: {:?}", e);
            Caller::Unverified
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http::HeaderValue;

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_token_lowercase_scheme_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("bearer abc123"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_token_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }
}
