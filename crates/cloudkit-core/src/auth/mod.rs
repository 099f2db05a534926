//! Authentication module for managing the user's session.
//!
//! This module provides:
//! - `AccessToken`, `RefreshToken`, `TokenPair`: the session credentials
//! - `TokenStore`: credentials persisted in `token.json` in the config dir
//! - `TokenRefresher`: the refresh endpoint call
//!
//! A session exists as long as a refresh token is stored. Access tokens are
//! replaced transparently by the authenticated transport when they expire.

pub mod refresh;
pub mod store;
pub mod token;

pub use refresh::TokenRefresher;
pub use store::TokenStore;
pub use token::{AccessToken, RefreshToken, TokenKind, TokenPair};
