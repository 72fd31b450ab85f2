use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Watchlist,
    Ratings,
    Comments,
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKey::Watchlist => write!(f, "leetmovie-watchlist"),
            StorageKey::Ratings => write!(f, "leetmovie-ratings"),
            StorageKey::Comments => write!(f, "leetmovie-comments"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value persistence for user state snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait Storage: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored under `key` yet.
    fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError>;

    fn save(&self, key: StorageKey, value: &Value) -> Result<(), StorageError>;
}

/// Reads a snapshot, falling back to `T::default()` when it is absent,
/// unreadable or does not decode.
pub fn load_snapshot<T>(storage: &dyn Storage, key: StorageKey) -> T
where
    T: DeserializeOwned + Default,
{
    match storage.load(key) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(%key, error = %e, "Discarding snapshot that does not decode");
                T::default()
            }
        },
        Ok(None) => {
            debug!(%key, "No snapshot stored yet");
            T::default()
        }
        Err(e) => {
            warn!(%key, error = %e, "Failed to load snapshot, starting empty");
            T::default()
        }
    }
}

/// Writes a full snapshot. Failures are logged and never reach the caller.
pub fn save_snapshot<T: Serialize>(storage: &dyn Storage, key: StorageKey, snapshot: &T) {
    let value = match serde_json::to_value(snapshot) {
        Ok(v) => v,
        Err(e) => {
            warn!(%key, error = %e, "Snapshot serialization error");
            return;
        }
    };

    if let Err(e) = storage.save(key, &value) {
        warn!(%key, error = %e, "Failed to persist snapshot, keeping in-memory state");
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!(bytes = content.len(), "Read snapshot");
        Ok(Some(serde_json::from_str(&content)?))
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display()))]
    fn save(&self, key: StorageKey, value: &Value) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        std::fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), "Wrote snapshot");
        Ok(())
    }
}

/// Non-persistent storage, kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<StorageKey, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(values.get(&key).cloned())
    }

    fn save(&self, key: StorageKey, value: &Value) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        values.insert(key, value.clone());
        Ok(())
    }
}
