//! The single source of truth for the signed-in session.
//!
//! The store keeps an in-memory copy of the [`Session`] and mirrors every
//! mutation into a [`DurableStorage`]. Writers hold the write lock for the
//! whole memory-plus-storage update, so `set`, `clear` and refresh updates
//! never interleave.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tracing::{debug, error, info, warn};

use crate::models::{Session, TokenGrant, User};
use crate::storage::{DurableStorage, StorageError};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),
    #[error("identity could not be serialized: {0}")]
    Identity(#[from] serde_json::Error),
    #[error("session was signed out")]
    SignedOut,
    #[error("session was replaced while the refresh was in flight")]
    Superseded,
}

pub struct SessionStore {
    storage: Arc<dyn DurableStorage>,
    current: RwLock<Session>,
}

impl SessionStore {
    /// Opens the store and re-hydrates the session from storage once.
    pub fn open(storage: Arc<dyn DurableStorage>) -> Self {
        let session = rehydrate(storage.as_ref());
        debug!(
            "Session store opened on '{}' (signed in: {}).",
            storage.describe(),
            session.has_credentials()
        );
        SessionStore {
            storage,
            current: RwLock::new(session),
        }
    }

    /// Current session. Never fails; a poisoned lock still yields the last value.
    pub fn get(&self) -> Session {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token()
            .map(str::to_string)
    }

    pub fn has_credentials(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .has_credentials()
    }

    /// Replaces the session. Storage is written first and memory only
    /// follows once storage accepted every field. Setting an absent
    /// session is the same as [`clear`](Self::clear).
    pub fn set(&self, session: Session) -> Result<(), SessionError> {
        if !session.has_credentials() {
            self.clear();
            return Ok(());
        }

        let mut current = self.write();
        if let Err(e) = self.persist(&session) {
            error!("Failed to persist session, keeping previous one: {}", e);
            // Restore storage to the in-memory view so both stay in step.
            let previous = current.clone();
            self.restore(&previous);
            return Err(e);
        }
        *current = session;
        Ok(())
    }

    /// Removes every session field from memory and storage. Idempotent.
    pub fn clear(&self) {
        let mut current = self.write();
        *current = Session::absent();
        self.purge();
    }

    /// Writes a refreshed access token (and rotated refresh token, if any)
    /// into the current session.
    ///
    /// `exchanged` is the refresh token the grant was obtained with. Fails
    /// with [`SessionError::SignedOut`] when the session was cleared while
    /// the refresh was in flight, and with [`SessionError::Superseded`] when
    /// it was replaced by another login or an earlier rotation.
    pub(crate) fn apply_refresh(
        &self,
        exchanged: &str,
        grant: &TokenGrant,
    ) -> Result<(), SessionError> {
        let mut current = self.write();
        match current.refresh_token() {
            None => return Err(SessionError::SignedOut),
            Some(held) if held != exchanged => return Err(SessionError::Superseded),
            Some(_) => {}
        }

        self.storage.set(ACCESS_TOKEN_KEY, &grant.access_token)?;
        if let Some(rotated) = &grant.refresh_token {
            self.storage.set(REFRESH_TOKEN_KEY, rotated)?;
        }
        *current = current.refreshed(&grant.access_token, grant.refresh_token.as_deref());
        info!(
            "Session refreshed (refresh token rotated: {}).",
            grant.refresh_token.is_some()
        );
        Ok(())
    }

    /// Clears the session only while it still holds `refresh_token`.
    /// Returns whether it did; a session replaced in the meantime is kept.
    pub(crate) fn clear_if_current(&self, refresh_token: &str) -> bool {
        let mut current = self.write();
        if current.refresh_token() != Some(refresh_token) {
            return false;
        }
        *current = Session::absent();
        self.purge();
        true
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, session: &Session) -> Result<(), SessionError> {
        // Only called with credentials present.
        let (Some(access), Some(refresh)) = (session.access_token(), session.refresh_token()) else {
            return Ok(());
        };
        self.storage.set(ACCESS_TOKEN_KEY, access)?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh)?;
        match session.identity() {
            Some(user) => self.storage.set(USER_KEY, &serde_json::to_string(user)?)?,
            None => self.storage.remove(USER_KEY)?,
        }
        Ok(())
    }

    fn restore(&self, previous: &Session) {
        if previous.has_credentials() {
            if let Err(e) = self.persist(previous) {
                error!("Failed to restore previous session in storage: {}", e);
            }
        } else {
            self.purge();
        }
    }

    fn purge(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                error!("Failed to remove '{}' from session storage: {}", key, e);
            }
        }
    }
}

fn rehydrate(storage: &dyn DurableStorage) -> Session {
    let read = |key: &str| match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read '{}' from session storage: {}", key, e);
            None
        }
    };

    match (read(ACCESS_TOKEN_KEY), read(REFRESH_TOKEN_KEY)) {
        (Some(access), Some(refresh)) => {
            let identity = read(USER_KEY).and_then(|raw| {
                serde_json::from_str::<User>(&raw)
                    .map_err(|e| warn!("Stored identity is unreadable, dropping it: {}", e))
                    .ok()
            });
            Session::authenticated(access, refresh, identity)
        }
        (None, None) => {
            if read(USER_KEY).is_some() {
                warn!("Stored identity without tokens; purging session storage.");
                purge_storage(storage);
            }
            Session::absent()
        }
        _ => {
            warn!("Stored session is half-present; purging session storage.");
            purge_storage(storage);
            Session::absent()
        }
    }
}

fn purge_storage(storage: &dyn DurableStorage) {
    for key in SESSION_KEYS {
        if let Err(e) = storage.remove(key) {
            error!("Failed to remove '{}' from session storage: {}", key, e);
        }
    }
}
