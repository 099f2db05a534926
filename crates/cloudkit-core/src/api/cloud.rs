//! Typed platform endpoints.
//!
//! This module provides `CloudApi`, which the CLI commands call to log in
//! and to read or create platform resources. Everything except `login`
//! requires a stored session and goes through the token-refreshing
//! transport.

use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    ApiRequest, AuthenticatedTransport, ClientError, HttpTransport, Transport, TransportError,
};
use crate::auth::{AccessToken, RefreshToken, TokenPair, TokenRefresher, TokenStore};
use crate::config::Config;
use crate::models::{Application, Environment, Hosting, Listing, ModelRef, User};

const LOGIN_PATH: [&str; 2] = ["admin", "login"];
const ME_PATH: [&str; 2] = ["admin", "me"];
const APPLICATIONS_PATH: [&str; 2] = ["application", "applications"];

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

pub struct CloudApi<T> {
    transport: AuthenticatedTransport<T>,
    config: Config,
}

impl CloudApi<HttpTransport> {
    /// API client over HTTP using the configured base URL and timeout.
    pub fn connect(config: Config, store: TokenStore) -> Result<Self, ClientError> {
        let http = HttpTransport::from_config(&config)?;
        Ok(Self::new(http, store, config))
    }
}

impl<T: Transport> CloudApi<T> {
    pub fn new(inner: T, store: TokenStore, config: Config) -> Self {
        let refresher = TokenRefresher::from_config(&config);
        Self {
            transport: AuthenticatedTransport::new(inner, store, refresher),
            config,
        }
    }

    pub fn store(&self) -> &TokenStore {
        self.transport.store()
    }

    /// Exchange credentials for a new session and persist it.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ClientError> {
        let url = self.url(&LOGIN_PATH, &[])?;
        let request = ApiRequest::post(url).json(&LoginRequest { email, password })?;
        let response = self.transport.respond(request).await?;
        let login: LoginResponse = response.json("login response")?;

        let pair = TokenPair::new(
            AccessToken::new(login.access_token),
            RefreshToken::new(login.refresh_token),
        );
        self.store().save(&pair)?;
        info!(email = email, "Logged in");
        Ok(pair)
    }

    /// Forget the stored session.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store().clear()?;
        info!("Logged out");
        Ok(())
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        self.get(self.url(&ME_PATH, &[])?, "user").await
    }

    pub async fn applications(&self) -> Result<Vec<Application>, ClientError> {
        let url = self.url(&APPLICATIONS_PATH, &[])?;
        let listing: Listing<Application> = self.get(url, "applications").await?;
        Ok(listing.into_items())
    }

    pub async fn application(&self, repo_name: &str) -> Result<Application, ClientError> {
        let url = self.url(&APPLICATIONS_PATH, &[repo_name])?;
        self.get(url, "application").await
    }

    /// Create an application in a project. `repo_name` is the slug the
    /// application is addressed by afterwards.
    pub async fn create_application(
        &self,
        project_id: &str,
        repo_name: &str,
        name: &str,
    ) -> Result<Application, ClientError> {
        let app = Application {
            id: None,
            name: name.to_string(),
            repo_name: repo_name.to_string(),
            project: Some(ModelRef::Model {
                id: project_id.to_string(),
            }),
            created_at: None,
        };
        let url = self.url(&APPLICATIONS_PATH, &[])?;
        self.post(url, &app, "application").await
    }

    pub async fn environments(&self, repo_name: &str) -> Result<Vec<Environment>, ClientError> {
        let url = self.url(&APPLICATIONS_PATH, &[repo_name, "hosting", "environments"])?;
        let listing: Listing<Environment> = self.get(url, "environments").await?;
        Ok(listing.into_items())
    }

    /// Add the hosting service to an application, deploying from `git_url`.
    pub async fn create_hosting(
        &self,
        repo_name: &str,
        git_url: &str,
    ) -> Result<Hosting, ClientError> {
        let app = self.application(repo_name).await?;
        let app_id = app.id.ok_or_else(|| {
            ClientError::InvalidResponse(format!("Application '{}' has no id", repo_name))
        })?;

        let hosting = Hosting {
            id: None,
            application: ModelRef::Model { id: app_id },
            git_url: git_url.to_string(),
        };
        let url = self.url(&APPLICATIONS_PATH, &[repo_name, "hosting"])?;
        self.post(url, &hosting, "hosting").await
    }

    /// Endpoint under the API base URL. `params` are user-supplied path
    /// segments and get percent-encoded, so they cannot change the route.
    fn url(&self, path: &[&str], params: &[&str]) -> Result<String, ClientError> {
        let base = &self.config.api_url;
        let mut url = Url::parse(base).map_err(|e| {
            TransportError::InvalidRequest(format!("Invalid API url '{}': {}", base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                TransportError::InvalidRequest(format!("API url '{}' cannot have a path", base))
            })?
            .pop_if_empty()
            .extend(path)
            .extend(params);
        Ok(url.into())
    }

    async fn get<R: DeserializeOwned>(&self, url: String, what: &str) -> Result<R, ClientError> {
        let request = self.transport.authorize(ApiRequest::get(url))?;
        debug!(url = %request.url, "GET");
        let response = self.transport.respond(request).await?;
        response.json(what)
    }

    async fn post<R: DeserializeOwned, B: Serialize>(
        &self,
        url: String,
        body: &B,
        what: &str,
    ) -> Result<R, ClientError> {
        let request = self.transport.authorize(ApiRequest::post(url).json(body)?)?;
        debug!(url = %request.url, "POST");
        let response = self.transport.respond(request).await?;
        response.json(what)
    }
}
