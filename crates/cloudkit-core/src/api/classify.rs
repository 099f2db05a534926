use super::{ApiResponse, ClientError};

/// Turn a completed response into a success or a [`ClientError::Remote`].
///
/// A JSON body with an `error` field and a string `reason` is a failure even
/// under a 2xx status. Otherwise anything outside 200..=299 fails with the
/// status' reason phrase.
pub fn classify(response: ApiResponse) -> Result<ApiResponse, ClientError> {
    let status = response.status.as_u16();

    if let Some(reason) = error_reason(&response) {
        return Err(ClientError::Remote { status, reason });
    }

    if !(200..=299).contains(&status) {
        let reason = response
            .status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string();
        return Err(ClientError::Remote { status, reason });
    }

    Ok(response)
}

fn error_reason(response: &ApiResponse) -> Option<String> {
    let body = response.json_value()?;
    body.get("error")?;
    body.get("reason")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn remote(err: ClientError) -> (u16, String) {
        match err {
            ClientError::Remote { status, reason } => (status, reason),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_success_passes_through() {
        let response = ApiResponse::json_body(StatusCode::OK, &json!({"id": "abc"}));
        let classified = classify(response).expect("success");
        assert_eq!(classified.status, StatusCode::OK);
        assert_eq!(classified.json_value(), Some(json!({"id": "abc"})));
    }

    #[test]
    fn test_error_body_overrides_success_status() {
        let response = ApiResponse::json_body(
            StatusCode::OK,
            &json!({"error": true, "reason": "Application name taken"}),
        );
        let (status, reason) = remote(classify(response).expect_err("error body"));
        assert_eq!(status, 200);
        assert_eq!(reason, "Application name taken");
    }

    #[test]
    fn test_error_body_reason_on_failure_status() {
        let response = ApiResponse::json_body(
            StatusCode::NOT_FOUND,
            &json!({"error": true, "reason": "No application with that repo name"}),
        );
        let (status, reason) = remote(classify(response).expect_err("not found"));
        assert_eq!(status, 404);
        assert_eq!(reason, "No application with that repo name");
    }

    #[test]
    fn test_failure_status_without_body_uses_reason_phrase() {
        let response = ApiResponse::new(StatusCode::BAD_GATEWAY, "");
        let (status, reason) = remote(classify(response).expect_err("bad gateway"));
        assert_eq!(status, 502);
        assert_eq!(reason, "Bad Gateway");
    }

    #[test]
    fn test_non_string_reason_falls_back_to_status() {
        let response = ApiResponse::json_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            &json!({"error": true, "reason": 12}),
        );
        let (status, reason) = remote(classify(response).expect_err("server error"));
        assert_eq!(status, 500);
        assert_eq!(reason, "Internal Server Error");

        // Same shape under a 2xx status is not an error
        let ok = ApiResponse::json_body(StatusCode::OK, &json!({"error": true, "reason": 12}));
        assert!(classify(ok).is_ok());
    }

    #[test]
    fn test_reason_without_error_field_is_success() {
        let response = ApiResponse::json_body(StatusCode::CREATED, &json!({"reason": "created"}));
        assert!(classify(response).is_ok());
    }

    #[test]
    fn test_unknown_status_phrase() {
        let status = StatusCode::from_u16(419).expect("valid status");
        let (code, reason) = remote(classify(ApiResponse::new(status, "")).expect_err("419"));
        assert_eq!(code, 419);
        assert_eq!(reason, "Unknown Status");
    }
}
