//! Core library for the cloudkit command-line client.
//!
//! This crate holds everything the `cloud` binary needs to talk to the
//! hosting platform:
//! - `auth`: access/refresh tokens, the on-disk credential file and the
//!   token refresh call
//! - `api`: the transport seam, the token-refreshing decorator over it,
//!   response classification and the typed platform endpoints
//! - `models`: platform resources returned by the API
//! - `config`: user configuration and directory resolution

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{
    ApiRequest, ApiResponse, AuthenticatedTransport, ClientError, CloudApi, HttpTransport,
    Transport, TransportError,
};
pub use auth::{AccessToken, RefreshToken, TokenPair, TokenStore};
pub use config::Config;
