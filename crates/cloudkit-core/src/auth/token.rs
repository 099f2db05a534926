use std::fmt;

use serde::{Deserialize, Serialize};

/// Which half of a session a bearer credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

macro_rules! bearer_token {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub const fn kind(&self) -> TokenKind {
                $kind
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        // Never print the credential itself.
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(<{} chars>)", stringify!($name), self.0.len())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

bearer_token!(
    /// Short-lived bearer credential sent with every authorized request.
    AccessToken,
    TokenKind::Access
);

bearer_token!(
    /// Long-lived credential used only to obtain a new access token.
    RefreshToken,
    TokenKind::Refresh
);

/// The credentials of one session.
///
/// `access` may be missing (never fetched) or stale (expired, not yet
/// noticed). `refresh` survives until logout or until the server rejects it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPair {
    pub access: Option<AccessToken>,
    pub refresh: Option<RefreshToken>,
}

impl TokenPair {
    pub fn new(access: AccessToken, refresh: RefreshToken) -> Self {
        Self {
            access: Some(access),
            refresh: Some(refresh),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}
