//! Session persistence
//!
//! The session is the only state that survives between runs. It is read on
//! every outbound request, written after login/register and removed on logout.
//! Stores are injected into [`ApiClient`](crate::api::ApiClient) so tests can
//! run without touching the filesystem.

use crate::error::{Error, Result};
use crate::types::Session;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Storage backend for the authenticated session
pub trait SessionStore: Send + Sync {
    /// Current session, if one is stored and readable
    ///
    /// Malformed stored data is treated as "no session".
    fn load(&self) -> Option<Session>;

    /// Replace the stored session
    fn save(&self, session: &Session) -> Result<()>;

    /// Remove the stored session; succeeds when nothing is stored
    fn clear(&self) -> Result<()>;
}

/// Session kept as a JSON document in a file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store backed by `path`; the file is created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the stored session
    ///
    /// Unlike [`SessionStore::load`], this reports why a session is missing.
    pub fn read(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() || raw.trim() == "null" {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::Parse(format!("{}: {}", self.path.display(), e)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        match self.read() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session");
                None
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(session)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session kept in process memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `session`
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}
