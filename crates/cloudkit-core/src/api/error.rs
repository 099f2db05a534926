use thiserror::Error;

/// Failures raised by a [`Transport`](super::Transport) before any response
/// exists. These pass through the authenticated layer untouched.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// No usable session: the refresh token is missing or was rejected,
    /// or the request stayed unauthorized after a refresh.
    #[error("Login required - run `cloud login` to start a new session")]
    LoginRequired,

    /// The platform answered but reported a failure.
    #[error("{status} - {reason}")]
    Remote { status: u16, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Could not save session: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ClientError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub(crate) fn invalid_response(what: &str, err: serde_json::Error, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body);
        ClientError::InvalidResponse(format!(
            "{}: {} (body: {})",
            what,
            err,
            Self::truncate_body(&body)
        ))
    }

    pub fn is_login_required(&self) -> bool {
        matches!(self, ClientError::LoginRequired)
    }

    /// Status code of a remote failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
