//! Durable client-side session storage.
//!
//! [`SessionStore`] is the injectable seam between the token-managing
//! client and whatever durable storage the host offers. The trait works on
//! raw string values under the canonical `KEY_*` constants from
//! `bankline-core`; the typed accessors are provided methods so every
//! implementation reads and writes the same keys -- key-name drift between
//! the portals is exactly the bug this design closes.
//!
//! [`MemoryStore`] backs tests and short-lived tools. [`FileStore`] is the
//! durable analogue of origin-scoped browser storage: a single JSON
//! document that survives process restart.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use bankline_core::session::{
    CredentialPair, Session, KEY_ACCESS_TOKEN, KEY_PERMISSIONS, KEY_REFRESH_TOKEN, KEY_SESSION,
};

/// Errors from durable session storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key/value storage for the session, scoped to one portal installation.
///
/// Only the login, refresh-success, and logout/refresh-failure paths write;
/// any request path may read. Absence of a value is `None`, never an error.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// The stored access token, if any.
    fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.get(KEY_ACCESS_TOKEN)
    }

    /// The stored refresh token, if any.
    fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        self.get(KEY_REFRESH_TOKEN)
    }

    /// Persist both halves of a credential pair.
    fn set_credentials(&self, credentials: &CredentialPair) -> Result<(), StoreError> {
        self.put(KEY_ACCESS_TOKEN, &credentials.access_token)?;
        self.put(KEY_REFRESH_TOKEN, &credentials.refresh_token)
    }

    /// The stored session object, if any.
    fn session(&self) -> Result<Option<Session>, StoreError> {
        match self.get(KEY_SESSION)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set_session(&self, session: &Session) -> Result<(), StoreError> {
        self.put(KEY_SESSION, &serde_json::to_string(session)?)
    }

    /// The cached effective-permission list, if any.
    fn permissions(&self) -> Result<Option<Vec<String>>, StoreError> {
        match self.get(KEY_PERMISSIONS)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set_permissions(&self, permissions: &[String]) -> Result<(), StoreError> {
        self.put(KEY_PERMISSIONS, &serde_json::to_string(permissions)?)
    }

    /// Remove every session key. Used by logout and terminal refresh
    /// failure.
    fn clear(&self) -> Result<(), StoreError> {
        self.remove(KEY_ACCESS_TOKEN)?;
        self.remove(KEY_REFRESH_TOKEN)?;
        self.remove(KEY_SESSION)?;
        self.remove(KEY_PERMISSIONS)
    }
}

/// In-process store. Not durable; for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // Recover from poisoning: the map itself cannot be left in a
        // torn state by any operation here.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values().remove(key);
        Ok(())
    }
}

/// Durable store backed by a single JSON document on disk.
///
/// Reads load the whole document; writes rewrite it. That is plenty for a
/// four-key session file and keeps the on-disk shape trivially inspectable.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`. The file is only
    /// written on the first `put`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        std::fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}
