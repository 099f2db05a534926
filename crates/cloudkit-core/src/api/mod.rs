//! REST API client module for the hosting platform.
//!
//! This module provides the `Transport` seam, the token-refreshing
//! `AuthenticatedTransport` decorator over it, response classification,
//! and `CloudApi` with the typed platform endpoints.
//!
//! The API uses bearer access tokens; expired ones are swapped for new ones
//! using the refresh token from the local credential file.

pub mod classify;
pub mod client;
pub mod cloud;
pub mod error;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use classify::classify;
pub use client::AuthenticatedTransport;
pub use cloud::CloudApi;
pub use error::{ClientError, TransportError};
pub use transport::{ApiRequest, ApiResponse, Attempt, HttpTransport, Transport};
