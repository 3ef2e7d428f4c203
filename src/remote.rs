//! Shared response handling for the hosted store's REST endpoints.

use reqwest::{Response, StatusCode};
use serde_json::Value;

use crate::domain::{DomainError, DomainResult};

/// Pass successful responses through; turn anything else into a
/// `DomainError::Store` carrying the store's own message.
pub(crate) async fn check_response(response: Response) -> DomainResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DomainError::Store(error_message(status, &body)))
}

/// Pull the human-readable message out of a PostgREST or auth error body.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    match detail {
        Some(message) => format!("{} ({})", message, status.as_u16()),
        None if body.trim().is_empty() => format!("request failed with status {}", status),
        None => format!("{} ({})", body.trim(), status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        let body = r#"{"code":"42501","message":"permission denied for table items"}"#;
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, body),
            "permission denied for table items (403)"
        );
    }

    #[test]
    fn test_error_message_auth_shape() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Invalid login credentials (400)"
        );
    }

    #[test]
    fn test_error_message_empty_body() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, ""),
            "request failed with status 502 Bad Gateway"
        );
    }
}
