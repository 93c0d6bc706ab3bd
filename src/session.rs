//! Client-side session context and durable storage.
//!
//! DESIGN
//! ======
//! The current session lives in an explicit [`SessionContext`] that the
//! login flow mutates and downstream consumers read. Durable storage is a
//! single record (the authenticated `User` plus the role the session was
//! tagged with) behind the [`SessionStore`] seam. Only insurer sign-ins are
//! written; any other sign-in clears the record so storage never outlives
//! the session it described.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::model::{Role, User};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored session is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// =============================================================================
// STORAGE
// =============================================================================

/// Durable home for the serialized session.
pub trait SessionStore: Send + Sync {
    /// Read the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the record exists but cannot be read.
    fn load(&self) -> Result<Option<Session>, StorageError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the record cannot be written.
    fn save(&self, session: &Session) -> Result<(), StorageError>;

    /// Remove the stored session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the record cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file store. On-disk layout is `{"user": {...}, "role": "insurer"}`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        tracing::debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store. Counts writes so callers can assert on side effects.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
    saves: AtomicUsize,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.session.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// SESSION CONTEXT
// =============================================================================

/// The signed-in user and the role the session is tagged with.
///
/// `role` is the role the user signed in as, which can differ from
/// `user.role` as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub role: Role,
}

impl Session {
    /// Session label, e.g. `"Regulator"`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.role.label()
    }
}

/// Explicit session context passed to the login flow and its consumers.
pub struct SessionContext {
    current: Option<Session>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").field("current", &self.current).finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Empty context backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { current: None, store }
    }

    /// Context pre-populated from whatever `store` holds. The stored role is
    /// used as is; it is never re-derived from the user record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored record cannot be read.
    pub fn restore(store: Arc<dyn SessionStore>) -> Result<Self, StorageError> {
        let current = store.load()?;
        if let Some(session) = &current {
            tracing::debug!(user = %session.user.username, role = %session.role, "session restored");
        }
        Ok(Self { current, store })
    }

    #[must_use]
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Install a session for `user` tagged with `role`.
    ///
    /// With `persist`, the session is written to storage first. Without it,
    /// any stored record is cleared first. A failed write or clear leaves the
    /// context unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when persisting fails.
    pub fn establish(&mut self, user: User, role: Role, persist: bool) -> Result<&Session, StorageError> {
        let session = Session { user, role };
        if persist {
            self.store.save(&session)?;
        } else {
            self.store.clear()?;
        }
        tracing::info!(user = %session.user.username, role = %role, persisted = persist, "session established");
        Ok(self.current.insert(session))
    }

    /// Drop the session and its stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the stored record cannot be removed.
    pub fn sign_out(&mut self) -> Result<(), StorageError> {
        self.store.clear()?;
        if let Some(session) = self.current.take() {
            tracing::info!(user = %session.user.username, "signed out");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
