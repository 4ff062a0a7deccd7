//! Session state: the persisted bearer token and the signed-in user.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use domain::models::{User, UserRole};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Key/value persistence for session data.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as a file inside a directory.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    dir: PathBuf,
}

impl FileTokenStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(|c: char| c == '/' || c == '\\') || key.contains("..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl TokenStorage for FileTokenStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path(key).ok()?;
        let value = fs::read_to_string(path).ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// The current session. The token lives in storage under a fixed key so
/// it survives restarts; the user profile is held in memory only.
pub struct Session {
    storage: Arc<dyn TokenStorage>,
    token_key: String,
    user: RwLock<Option<User>>,
}

impl Session {
    pub fn new(storage: Arc<dyn TokenStorage>, token_key: impl Into<String>) -> Self {
        Self {
            storage,
            token_key: token_key.into(),
            user: RwLock::new(None),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(&self.token_key)
    }

    pub fn is_active(&self) -> bool {
        self.token().is_some()
    }

    /// Persist `token` and remember `user`.
    pub fn start(&self, token: &str, user: Option<User>) -> Result<(), StorageError> {
        self.storage.set(&self.token_key, token)?;
        self.set_user(user);
        Ok(())
    }

    pub fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    pub fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user().and_then(|u| u.role)
    }

    /// Drop the token and the user.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(&self.token_key) {
            tracing::warn!(error = %e, "Failed to remove persisted token");
        }
        self.set_user(None);
    }
}
