//! Exchange a refresh token for a new access token.

use serde::Deserialize;
use tracing::{debug, warn};

use super::{AccessToken, RefreshToken};
use crate::api::{classify, ApiRequest, ClientError, Transport};
use crate::config::Config;

/// Path of the refresh endpoint under the API base URL
pub const REFRESH_PATH: &str = "admin/refresh";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

/// Client for the token refresh endpoint.
///
/// Only fetches the token; storing it and retrying the rejected request is
/// up to the caller.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    url: String,
}

impl TokenRefresher {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoint(REFRESH_PATH))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Makes a POST request to the refresh endpoint, authorized with the
    /// refresh token.
    ///
    /// An authorization failure here means the refresh token itself is dead,
    /// which is reported as `LoginRequired`.
    pub async fn refresh<T: Transport + ?Sized>(
        &self,
        transport: &T,
        token: &RefreshToken,
    ) -> Result<AccessToken, ClientError> {
        debug!(url = %self.url, "Refreshing access token");

        let request = ApiRequest::post(&self.url).bearer_auth(token.as_str())?;
        let response = transport.respond(request).await?;

        if response.requires_refresh() {
            warn!(status = response.status.as_u16(), "Refresh token rejected");
            return Err(ClientError::LoginRequired);
        }

        let response = classify(response)?;
        let refreshed: RefreshResponse = response.json("refresh response")?;
        Ok(AccessToken::new(refreshed.access_token))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::mock::{url, MockTransport};

    #[tokio::test]
    async fn test_refresh_returns_new_access_token() {
        let mock = MockTransport::new();
        mock.reply(REFRESH_PATH, 200, json!({"accessToken": "a2"}));

        let refresher = TokenRefresher::new(url(REFRESH_PATH));
        let token = refresher
            .refresh(&mock, &RefreshToken::new("r1"))
            .await
            .expect("refresh");
        assert_eq!(token, AccessToken::new("a2"));
        assert_eq!(mock.requests()[0].bearer(), Some("r1"));
    }

    #[tokio::test]
    async fn test_rejected_refresh_token_requires_login() {
        for status in [401, 403, 419] {
            let mock = MockTransport::new();
            mock.reply_empty(REFRESH_PATH, status);

            let err = TokenRefresher::new(url(REFRESH_PATH))
                .refresh(&mock, &RefreshToken::new("r1"))
                .await
                .expect_err("rejected");
            assert!(err.is_login_required(), "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_malformed_refresh_response() {
        let mock = MockTransport::new();
        mock.reply(REFRESH_PATH, 200, json!({"token": "a2"}));

        let err = TokenRefresher::new(url(REFRESH_PATH))
            .refresh(&mock, &RefreshToken::new("r1"))
            .await
            .expect_err("missing accessToken");
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn test_refresh_url_from_config() {
        let config = Config {
            api_url: "http://localhost:8080".to_string(),
            ..Config::default()
        };
        assert_eq!(
            TokenRefresher::from_config(&config).url(),
            "http://localhost:8080/admin/refresh"
        );
    }
}
