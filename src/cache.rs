use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::CacheSettings;

/// Read views that may be served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    Standings,
    Races,
    Drivers,
}

impl CacheKey {
    pub fn key(self) -> &'static str {
        match self {
            CacheKey::Standings => "race-pool:standings",
            CacheKey::Races => "race-pool:races",
            CacheKey::Drivers => "race-pool:drivers",
        }
    }

    fn ttl(self, settings: &CacheSettings) -> u64 {
        match self {
            CacheKey::Standings => settings.standings_ttl_secs,
            CacheKey::Races => settings.races_ttl_secs,
            CacheKey::Drivers => settings.drivers_ttl_secs,
        }
    }
}

/// Cached value with the time it was stored
#[derive(Debug, Serialize, Deserialize)]
struct CachedEntry<T> {
    cached_at: u64, // Unix timestamp
    value: T,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Check whether an entry stored at `cached_at` is still within `ttl_secs`.
pub fn is_fresh(cached_at: u64, ttl_secs: u64, now: u64) -> bool {
    cached_at <= now && now - cached_at < ttl_secs
}

/// Disk-backed TTL cache for read views.
///
/// The cache is advisory: any failure to read or write it is logged and the
/// caller falls through to the store.
#[derive(Debug, Clone)]
pub struct ReadCache {
    path: Option<PathBuf>,
    settings: CacheSettings,
}

impl ReadCache {
    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            path: None,
            settings: CacheSettings {
                enabled: false,
                ..CacheSettings::default()
            },
        }
    }

    pub fn new(path: impl Into<PathBuf>, settings: &CacheSettings) -> Self {
        if !settings.enabled {
            return Self::disabled();
        }
        Self {
            path: Some(path.into()),
            settings: settings.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// The cached value for `key`, if there is one and it is still fresh.
    pub fn get<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        let path = self.path.as_deref()?;
        let entry = read_entry::<T>(path, key)?;
        if is_fresh(entry.cached_at, key.ttl(&self.settings), now_secs()) {
            tracing::debug!(key = key.key(), "cache hit");
            Some(entry.value)
        } else {
            tracing::debug!(key = key.key(), "cache entry expired");
            None
        }
    }

    /// Store `value` under `key`, stamped with the current time.
    ///
    /// Callers must hold the store's read lock from the load that produced
    /// `value` until this returns, or a commit in between leaves a stale entry.
    pub fn put<T: Serialize>(&self, key: CacheKey, value: &T) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let entry = CachedEntry {
            cached_at: now_secs(),
            value,
        };
        if let Err(e) = write_entry(path, key, &entry) {
            let error = format!("{:#}", e);
            tracing::warn!(key = key.key(), %error, "failed to write cache entry");
        }
    }

    /// Drop the given keys so the next read goes to the store.
    pub fn invalidate(&self, keys: &[CacheKey]) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        for key in keys {
            match cacache::remove_sync(path, key.key()) {
                Ok(()) => tracing::debug!(key = key.key(), "cache invalidated"),
                Err(e) => {
                    tracing::warn!(key = key.key(), error = %e, "failed to invalidate cache entry")
                }
            }
        }
    }
}

fn read_entry<T: DeserializeOwned>(path: &Path, key: CacheKey) -> Option<CachedEntry<T>> {
    let bytes = cacache::read_sync(path, key.key()).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::debug!(key = key.key(), error = %e, "ignoring undecodable cache entry");
            None
        }
    }
}

fn write_entry<T: Serialize>(path: &Path, key: CacheKey, entry: &CachedEntry<T>) -> Result<()> {
    let json = serde_json::to_vec(entry).context("Failed to serialize cache entry")?;
    cacache::write_sync(path, key.key(), &json).context("Failed to write cache entry")?;
    Ok(())
}

/// Remove the whole read cache directory.
pub fn clear_cache(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}
