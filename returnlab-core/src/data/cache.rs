//! Response cache: one JSON envelope per ticker with a freshness window.
//!
//! Disk layout: `{cache_dir}/{TICKER}.json`
//!
//! - Atomic writes (write to .tmp, rename into place)
//! - blake3 integrity hash validated on load
//! - Quarantine for corrupt entries ({filename}.quarantined)
//! - Entries past the freshness window stay on disk as stale fallbacks

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::data::DataError;

/// Freshness window in milliseconds: entries older than this trigger a
/// refresh attempt (they remain usable as stale fallbacks).
pub const CACHE_TTL_MS: i64 = 86_400_000 * 7;

/// One cached provider response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub stored_at: DateTime<Utc>,
    pub body: String,
    body_hash: String,
}

impl CacheEntry {
    pub fn new(body: String, stored_at: DateTime<Utc>) -> Self {
        let body_hash = blake3::hash(body.as_bytes()).to_hex().to_string();
        Self {
            stored_at,
            body,
            body_hash,
        }
    }

    /// Whether the entry is still inside the freshness window at `now`.
    /// The boundary is exclusive: an entry exactly `CACHE_TTL_MS` old is
    /// already stale.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now - self.stored_at < Duration::milliseconds(CACHE_TTL_MS)
    }

    fn integrity_ok(&self) -> bool {
        blake3::hash(self.body.as_bytes()).to_hex().to_string() == self.body_hash
    }
}

/// Keyed store of cached provider responses.
///
/// One entry per normalized ticker. Within a run, `get` must observe the
/// latest `put` for the same key; no multi-key consistency is required.
pub trait ResponseStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry>;
    fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), DataError>;
    /// Drop every entry in the store's namespace.
    fn clear(&self) -> Result<(), DataError>;
    /// Best-effort recovery after a failed `put`: clear the namespace, then
    /// retry the write once. Implementations may run this off-thread; all
    /// errors are swallowed.
    fn repair(&self, key: &str, entry: &CacheEntry);
}

/// On-disk response store.
pub struct DiskStore {
    cache_dir: PathBuf,
}

impl DiskStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.json"))
    }
}

impl ResponseStore for DiskStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let content = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                quarantine(&path, &e.to_string());
                return None;
            }
        };
        if !entry.integrity_ok() {
            quarantine(&path, "integrity hash mismatch");
            return None;
        }
        Some(entry)
    }

    fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), DataError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheWriteFailed(format!("create dir: {e}")))?;

        let path = self.entry_path(key);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string(entry)
            .map_err(|e| DataError::CacheWriteFailed(format!("serialize entry: {e}")))?;
        fs::write(&tmp_path, json)
            .map_err(|e| DataError::CacheWriteFailed(format!("write: {e}")))?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheWriteFailed(format!("atomic rename failed: {e}"))
        })
    }

    fn clear(&self) -> Result<(), DataError> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)
                .map_err(|e| DataError::CacheError(format!("clear: {e}")))?;
        }
        Ok(())
    }

    fn repair(&self, key: &str, entry: &CacheEntry) {
        let store = Self::new(self.cache_dir.clone());
        let key = key.to_string();
        let entry = entry.clone();
        std::thread::spawn(move || {
            match store.clear().and_then(|()| store.put(&key, &entry)) {
                Ok(()) => tracing::debug!(key = %key, "cache repaired after failed write"),
                Err(e) => tracing::warn!(key = %key, error = %e, "cache repair failed"),
            }
        });
    }
}

fn quarantine(path: &Path, reason: &str) {
    tracing::warn!(path = %path.display(), reason, "quarantining corrupt cache entry");
    let target = path.with_extension("json.quarantined");
    let _ = fs::rename(path, &target);
}

/// In-memory response store (tests and ephemeral runs).
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ResponseStore for MemoryStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), DataError> {
        self.lock().insert(key.to_string(), entry.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), DataError> {
        self.lock().clear();
        Ok(())
    }

    fn repair(&self, key: &str, entry: &CacheEntry) {
        let _ = self.clear();
        let _ = self.put(key, entry);
    }
}
