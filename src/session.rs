//! File-backed session: who is logged in, and the API key for the remote
//! store. A session is a single optional identity with no expiry logic.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::sync::SessionProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub api_key: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to write session file '{0}': {1}")]
    Write(PathBuf, std::io::Error),
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Loads and persists the current session as a small YAML file.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The current session, or `None` if logged out. A corrupt file is
    /// treated as logged out (with a warning) rather than an error.
    pub fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_yaml::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(
                    "ignoring corrupt session file {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::Write(self.path.clone(), e))?;
        }
        let contents = serde_yaml::to_string(session)?;
        std::fs::write(&self.path, contents)
            .map_err(|e| SessionError::Write(self.path.clone(), e))
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Write(self.path.clone(), e)),
        }
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.load().map(|s| s.user_id)
    }
}

impl SessionProvider for SessionStore {
    fn current_user_id(&self) -> Option<String> {
        SessionStore::current_user_id(self)
    }
}
