//! Token-refreshing decorator over a [`Transport`].
//!
//! Every authenticated call made by the CLI goes through
//! [`AuthenticatedTransport::respond`]. When the platform rejects the access
//! token (401, 403 or 419) the session is refreshed and the request is
//! retried exactly once. Whatever comes back last is classified into a
//! success or a [`ClientError`].

use tracing::{debug, warn};

use super::{classify, ApiRequest, ApiResponse, ClientError, Transport};
use crate::auth::{RefreshToken, TokenRefresher, TokenStore};

pub struct AuthenticatedTransport<T> {
    inner: T,
    store: TokenStore,
    refresher: TokenRefresher,
}

impl<T: Transport> AuthenticatedTransport<T> {
    pub fn new(inner: T, store: TokenStore, refresher: TokenRefresher) -> Self {
        Self {
            inner,
            store,
            refresher,
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Attach the stored session to `request`, failing with `LoginRequired`
    /// when there is none.
    pub fn authorize(&self, request: ApiRequest) -> Result<ApiRequest, ClientError> {
        let token = self.store.require_session()?;
        Ok(request.with_token(token)?)
    }

    /// Send `request`, refreshing the session at most once.
    ///
    /// Transport failures are returned as-is. A retry that is still
    /// unauthorized ends in `LoginRequired`.
    pub async fn respond(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let response = self.inner.respond(request.clone()).await?;
        let response = self.handle(request, response).await?;
        classify(response)
    }

    async fn handle(
        &self,
        request: ApiRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, ClientError> {
        // A retry is never retried again
        if request.is_refresh_attempt() {
            return Ok(response);
        }
        if !response.requires_refresh() {
            return Ok(response);
        }
        let Some(refresh) = request.token().and_then(|t| t.refresh.clone()) else {
            debug!(url = %request.url, "Unauthorized request has no session to refresh");
            return Ok(response);
        };
        self.refresh(request, &refresh, response.status.as_u16()).await
    }

    async fn refresh(
        &self,
        request: ApiRequest,
        token: &RefreshToken,
        status: u16,
    ) -> Result<ApiResponse, ClientError> {
        warn!(url = %request.url, status = status, "Access token rejected, refreshing session");

        let access = self.refresher.refresh(&self.inner, token).await?;

        // The retry still goes out if the new token cannot be written
        if let Err(e) = self.store.set_access_token(Some(access.clone())) {
            warn!(path = %self.store.path().display(), error = %e, "Could not save session");
        }

        let retry = request.into_refresh_attempt(access)?;
        let response = self.inner.respond(retry).await?;
        if response.requires_refresh() {
            warn!(status = response.status.as_u16(), "Request still unauthorized after refresh");
            return Err(ClientError::LoginRequired);
        }
        Ok(response)
    }
}
