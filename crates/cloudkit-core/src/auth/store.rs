use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use super::{AccessToken, RefreshToken, TokenPair};
use crate::api::ClientError;

/// Credential file name in the config directory
const TOKEN_FILE: &str = "token.json";

const ACCESS_KEY: &str = "access";
const REFRESH_KEY: &str = "refresh";

/// Contents of the credential file as a JSON object.
///
/// Each token is read from its own key, so a bad value under one key does
/// not hide the other. Unknown keys are written back untouched.
#[derive(Debug, Default)]
struct CredentialFile {
    entries: Map<String, Value>,
}

impl CredentialFile {
    fn token(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    fn set(&mut self, key: &str, token: Option<&str>) {
        match token {
            Some(token) => {
                self.entries
                    .insert(key.to_string(), Value::String(token.to_string()));
            }
            None => {
                self.entries.remove(key);
            }
        }
    }

    fn pair(&self) -> TokenPair {
        TokenPair {
            access: self.token(ACCESS_KEY).map(AccessToken::from),
            refresh: self.token(REFRESH_KEY).map(RefreshToken::from),
        }
    }
}

/// Access and refresh tokens persisted in `token.json`.
///
/// Every accessor goes back to disk; nothing is cached between calls, so
/// edits made to the file by another process are picked up. Concurrent
/// writers are last-write-wins.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// Open the store in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open the store and require an existing session.
    ///
    /// This is the gate every authenticated command goes through before
    /// building a request.
    pub fn require_global(dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let store = Self::open(dir)?;
        store.require_session()?;
        Ok(store)
    }

    /// Current token pair, or `LoginRequired` when there is no refresh token.
    pub fn require_session(&self) -> Result<TokenPair, ClientError> {
        let pair = self.load();
        if pair.refresh.is_none() {
            debug!(path = %self.path().display(), "No refresh token stored");
            return Err(ClientError::LoginRequired);
        }
        Ok(pair)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    /// Read the token pair. A missing, unreadable or malformed file is an
    /// empty pair, which is how "not logged in" is represented.
    pub fn load(&self) -> TokenPair {
        self.read_file().pair()
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.load().access
    }

    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.load().refresh
    }

    pub fn set_access_token(&self, token: Option<AccessToken>) -> Result<(), ClientError> {
        let mut file = self.read_file();
        file.set(ACCESS_KEY, token.as_ref().map(AccessToken::as_str));
        self.write_file(&file)
    }

    pub fn set_refresh_token(&self, token: Option<RefreshToken>) -> Result<(), ClientError> {
        let mut file = self.read_file();
        file.set(REFRESH_KEY, token.as_ref().map(RefreshToken::as_str));
        self.write_file(&file)
    }

    /// Store both halves of a fresh session in one write.
    pub fn save(&self, pair: &TokenPair) -> Result<(), ClientError> {
        let mut file = self.read_file();
        file.set(ACCESS_KEY, pair.access.as_ref().map(AccessToken::as_str));
        file.set(REFRESH_KEY, pair.refresh.as_ref().map(RefreshToken::as_str));
        self.write_file(&file)
    }

    /// Forget the session (logout).
    pub fn clear(&self) -> Result<(), ClientError> {
        self.save(&TokenPair::default())
    }

    fn read_file(&self) -> CredentialFile {
        let path = self.path();
        let contents = match std::fs::read(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No session read");
                return CredentialFile::default();
            }
        };

        match serde_json::from_slice::<Value>(&contents) {
            Ok(Value::Object(entries)) => CredentialFile { entries },
            Ok(_) => {
                debug!(path = %path.display(), "Credential file is not a JSON object");
                CredentialFile::default()
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring malformed credential file");
                CredentialFile::default()
            }
        }
    }

    fn write_file(&self, file: &CredentialFile) -> Result<(), ClientError> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            serde_json::to_string_pretty(&file.entries).map_err(std::io::Error::other)?;
        std::fs::write(&path, contents)?;
        restrict_permissions(&path)?;
        Ok(())
    }
}

/// Owner read/write only on Unix.
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
