//! Persisted sign-in session.
//!
//! The access token lives in `session.yml` next to the configuration file and
//! is attached to every API request. Any 401 response expires the session,
//! which removes the token from memory and from disk.

use crate::config::ConfigError;
use chrono::Utc;
use log::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

const FILE_NAME: &str = "session.yml";

/// Specifying the session lifecycle.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    SignedOut,
    SignedIn,
    Expired,
}

#[derive(Serialize, Deserialize)]
struct FileSpec {
    access_token: String,
    #[serde(default)]
    saved_at: Option<String>,
}

struct Inner {
    token: Option<String>,
    status: SessionStatus,
}

/// Holds the access token shared by the API client and the UI.
///
pub struct Session {
    inner: RwLock<Inner>,
    file_path: Option<PathBuf>,
}

impl Session {
    /// Return a session that is never written to disk.
    ///
    pub fn in_memory(token: Option<String>) -> Session {
        let status = if token.is_some() {
            SessionStatus::SignedIn
        } else {
            SessionStatus::SignedOut
        };
        Session {
            inner: RwLock::new(Inner { token, status }),
            file_path: None,
        }
    }

    /// Load the session stored in the given directory, if any.
    ///
    pub fn load(dir_path: &Path) -> Result<Session, ConfigError> {
        let file_path = dir_path.join(FILE_NAME);
        let mut token = None;
        if file_path.exists() {
            let contents = fs::read_to_string(&file_path).map_err(|e| ConfigError::LoadFailed {
                path: file_path.clone(),
                message: format!("IO error: {}", e),
            })?;
            let data: FileSpec = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
            if !data.access_token.trim().is_empty() {
                token = Some(data.access_token);
            }
        }
        let mut session = Session::in_memory(token);
        session.file_path = Some(file_path);
        Ok(session)
    }

    pub fn token(&self) -> Option<String> {
        self.read(|inner| inner.token.clone())
    }

    pub fn status(&self) -> SessionStatus {
        self.read(|inner| inner.status)
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::SignedIn
    }

    /// Store a new token in memory and on disk.
    ///
    pub fn sign_in(&self, token: &str) -> Result<(), ConfigError> {
        let token = token.trim().to_owned();
        if token.is_empty() {
            return Err(ConfigError::AccessTokenNotSet);
        }
        if let Some(ref path) = self.file_path {
            let data = FileSpec {
                access_token: token.clone(),
                saved_at: Some(Utc::now().to_rfc3339()),
            };
            let content = serde_yaml::to_string(&data)
                .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
                path: path.clone(),
                source: e,
            })?;
        }
        self.write(|inner| {
            inner.token = Some(token);
            inner.status = SessionStatus::SignedIn;
        });
        info!("Signed in.");
        Ok(())
    }

    /// Drop the token after the server rejected it.
    ///
    pub fn expire(&self) {
        if self.clear(SessionStatus::Expired) {
            warn!("Session expired, credentials cleared.");
        }
    }

    /// Drop the token at the operator's request.
    ///
    pub fn sign_out(&self) {
        if self.clear(SessionStatus::SignedOut) {
            info!("Signed out.");
        }
    }

    /// Clear memory and disk. Returns false if there was nothing to clear.
    ///
    fn clear(&self, status: SessionStatus) -> bool {
        let had_token = self.write(|inner| {
            let had_token = inner.token.take().is_some();
            inner.status = status;
            had_token
        });
        if let Some(ref path) = self.file_path {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    error!("Failed to remove session file {}: {}", path.display(), e);
                }
            }
        }
        had_token
    }

    fn read<R>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "academy-admin-session-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_in_memory_status() {
        assert_eq!(Session::in_memory(None).status(), SessionStatus::SignedOut);
        let session = Session::in_memory(Some("t".to_string()));
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("t"));
    }

    #[test]
    fn test_expire_clears_token() {
        let session = Session::in_memory(Some("t".to_string()));
        session.expire();
        assert_eq!(session.token(), None);
        assert_eq!(session.status(), SessionStatus::Expired);
    }

    #[test]
    fn test_sign_in_rejects_blank_token() {
        let session = Session::in_memory(None);
        assert!(matches!(
            session.sign_in("  "),
            Err(ConfigError::AccessTokenNotSet)
        ));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_sign_in_persists_and_expire_removes_file() {
        let dir = temp_dir("persist");
        let session = Session::load(&dir).unwrap();
        assert_eq!(session.status(), SessionStatus::SignedOut);

        session.sign_in("secret-token").unwrap();
        assert!(dir.join(FILE_NAME).exists());

        let reloaded = Session::load(&dir).unwrap();
        assert_eq!(reloaded.token().as_deref(), Some("secret-token"));

        reloaded.expire();
        assert!(!dir.join(FILE_NAME).exists());
        assert_eq!(Session::load(&dir).unwrap().token(), None);

        let _ = fs::remove_dir_all(&dir);
    }
}
