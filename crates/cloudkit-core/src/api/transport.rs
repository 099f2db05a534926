//! The request/response seam every API call goes through.
//!
//! [`Transport`] is a single `respond` capability. [`HttpTransport`] is the
//! reqwest-backed implementation used by the binary; tests substitute an
//! in-memory one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::trace;

use super::{ClientError, TransportError};
use crate::auth::{AccessToken, TokenPair};
use crate::config::Config;

/// Statuses that may mean the access token expired.
const REFRESHABLE_STATUSES: [u16; 3] = [401, 403, 419];

/// Whether a request is the caller's original or the one retry issued
/// after a token refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attempt {
    #[default]
    Original,
    RefreshRetry,
}

/// An outgoing API request and the session it was built for.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    token: Option<TokenPair>,
    attempt: Attempt,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            method,
            url: url.into(),
            headers,
            body: None,
            token: None,
            attempt: Attempt::Original,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, TransportError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| TransportError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(bytes);
        Ok(self)
    }

    /// Set `Authorization: Bearer <token>`.
    pub fn bearer_auth(mut self, token: &str) -> Result<Self, TransportError> {
        self.set_bearer(token)?;
        Ok(self)
    }

    /// Attach a session. Its access token, if any, becomes the bearer and
    /// its refresh token makes the request eligible for a refresh.
    pub fn with_token(mut self, token: TokenPair) -> Result<Self, TransportError> {
        if let Some(ref access) = token.access {
            self.set_bearer(access.as_str())?;
        }
        self.token = Some(token);
        Ok(self)
    }

    pub fn token(&self) -> Option<&TokenPair> {
        self.token.as_ref()
    }

    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    pub fn is_refresh_attempt(&self) -> bool {
        self.attempt == Attempt::RefreshRetry
    }

    /// Bearer credential currently on the request, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    /// The single retry of this request, carrying a freshly issued access
    /// token.
    pub(crate) fn into_refresh_attempt(
        mut self,
        access: AccessToken,
    ) -> Result<Self, TransportError> {
        self.set_bearer(access.as_str())?;
        if let Some(ref mut token) = self.token {
            token.access = Some(access);
        }
        self.attempt = Attempt::RefreshRetry;
        Ok(self)
    }

    fn set_bearer(&mut self, token: &str) -> Result<(), TransportError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| TransportError::InvalidRequest(format!("Invalid bearer token: {}", e)))?;
        self.headers.insert(header::AUTHORIZATION, value);
        Ok(())
    }
}

/// A completed response with its body fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Response with a JSON body, mostly for test transports.
    pub fn json_body(status: StatusCode, body: &Value) -> Self {
        let mut response = Self::new(status, body.to_string());
        response
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    /// 401, 403 or 419: the access token may need refreshing.
    pub fn requires_refresh(&self) -> bool {
        REFRESHABLE_STATUSES.contains(&self.status.as_u16())
    }

    /// Body parsed as JSON, or `None` when it is not JSON.
    pub fn json_value(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Decode the body into `T`; `what` names the payload in the error.
    pub fn json<T: DeserializeOwned>(&self, what: &str) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::invalid_response(what, e, &self.body))
    }
}

/// Anything that can turn a request into a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn respond(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn respond(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).respond(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn respond(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).respond(request).await
    }
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cloudkit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(config.request_timeout())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn respond(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        trace!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        trace!(status = status.as_u16(), bytes = body.len(), "Received response");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
