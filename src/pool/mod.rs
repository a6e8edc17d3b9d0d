//! Pool operations. Every mutation runs as one transaction over a snapshot of
//! the store; reads of the hot views go through the read cache.

mod import;
mod races;
mod results;
mod standings;
mod teams;

pub use import::ImportSummary;
pub use races::{RaceDetail, RaceFields, ResultLine};
pub use results::{ResultsSubmission, RolloverTarget, TeamPoints};
pub use standings::{rank_standings, Standing};
pub use teams::{TeamDetail, TeamDriver};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::RwLock;

use crate::cache::{CacheKey, ReadCache};
use crate::store::{LockMode, MemoryStore, PoolData, Store};
use crate::PoolError;

/// Explicit context for pool operations: a store handle and a read cache.
pub struct PoolContext {
    store: Box<dyn Store>,
    cache: ReadCache,
    /// Writers take it exclusively; cache fills share it.
    lock: RwLock<()>,
}

impl PoolContext {
    pub fn new(store: impl Store + 'static, cache: ReadCache) -> Self {
        Self {
            store: Box::new(store),
            cache,
            lock: RwLock::new(()),
        }
    }

    /// Empty in-memory pool with caching off.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), ReadCache::disabled())
    }

    /// Current pool contents, straight from the store.
    pub fn snapshot(&self) -> Result<PoolData, PoolError> {
        Ok(self.store.load()?)
    }

    /// Serve a read view from the cache, or build it from a fresh snapshot and
    /// cache it.
    ///
    /// The load and the cache write happen under a shared lock, so a commit
    /// and its invalidation land either wholly before the load or wholly after
    /// the write.
    fn cached<T, F>(&self, key: CacheKey, view: F) -> Result<T, PoolError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(PoolData) -> Result<T, PoolError>,
    {
        if !self.cache.is_enabled() {
            return view(self.snapshot()?);
        }
        if let Some(value) = self.cache.get(key) {
            return Ok(value);
        }

        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        let _lock = self.store.lock(LockMode::Shared)?;
        let value = view(self.store.load()?)?;
        self.cache.put(key, &value);
        Ok(value)
    }

    /// Run `f` against a copy of the pool and commit the copy if it succeeds.
    ///
    /// Transactions are serialized within the process and, for stores that
    /// lock, across processes. When `f` fails the copy is dropped and the
    /// store is left as it was; after a commit the given cache keys are
    /// invalidated before the lock is released.
    fn transact<T, F>(&self, invalidates: &[CacheKey], f: F) -> Result<T, PoolError>
    where
        F: FnOnce(&mut PoolData) -> Result<T, PoolError>,
    {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let _lock = self.store.lock(LockMode::Exclusive)?;

        let mut data = self.store.load()?;
        let out = f(&mut data)?;
        self.store.commit(&data)?;
        self.cache.invalidate(invalidates);

        tracing::debug!("transaction committed");
        Ok(out)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheSettings;
    use crate::store::JsonFileStore;
    use anyhow::Result;
    use std::sync::mpsc;
    use std::time::Duration;
    use test_support::small_pool;

    /// Loads fine, refuses every commit.
    struct FailingStore(PoolData);

    impl Store for FailingStore {
        fn load(&self) -> Result<PoolData> {
            Ok(self.0.clone())
        }

        fn commit(&self, _data: &PoolData) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn test_failed_closure_leaves_store_untouched() {
        let pool = PoolContext::new(MemoryStore::with_data(small_pool(1)), ReadCache::disabled());

        let result: Result<(), PoolError> = pool.transact(&[], |data| {
            data.participants.clear();
            Err(PoolError::validation("nope"))
        });

        assert!(result.unwrap_err().is_validation());
        assert_eq!(pool.snapshot().unwrap().participants.len(), 2);
    }

    #[test]
    fn test_commit_failure_is_storage_error() {
        let pool = PoolContext::new(FailingStore(small_pool(1)), ReadCache::disabled());

        let err = pool
            .transact(&[], |data| {
                data.participants.clear();
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, PoolError::Storage(_)));
        assert_eq!(err.to_string(), "storage error: disk full");
        assert_eq!(pool.snapshot().unwrap().participants.len(), 2);
    }

    #[test]
    fn test_successful_transaction_commits() {
        let pool = PoolContext::in_memory();
        pool.transact(&[], |data| {
            data.participants.push(test_support::participant(1, "Avery"));
            Ok(())
        })
        .unwrap();

        assert_eq!(pool.snapshot().unwrap().participants.len(), 1);
    }

    #[test]
    fn test_transactions_from_separate_handles_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.json");

        // Each thread opens its own context, as two CLI invocations would.
        std::thread::scope(|s| {
            for worker in 0..2 {
                let path = path.clone();
                s.spawn(move || {
                    let pool = PoolContext::new(JsonFileStore::new(path), ReadCache::disabled());
                    for i in 0..20 {
                        pool.transact(&[], |data| {
                            let id = data.next_participant_id();
                            let name = format!("Worker {} #{}", worker, i);
                            data.participants.push(test_support::participant(id, &name));
                            Ok(())
                        })
                        .unwrap();
                    }
                });
            }
        });

        let data = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(data.participants.len(), 40);
    }

    #[test]
    fn test_commit_during_cache_fill_is_not_masked_by_stale_entry() {
        let dir = tempfile::tempdir().unwrap();
        let pool = PoolContext::new(
            JsonFileStore::new(dir.path().join("pool.json")),
            ReadCache::new(dir.path().join("cache"), &CacheSettings::default()),
        );
        pool.transact(&[], |data| {
            *data = small_pool(1);
            Ok(())
        })
        .unwrap();

        let (loaded_tx, loaded_rx) = mpsc::channel();
        std::thread::scope(|s| {
            let pool = &pool;
            s.spawn(move || {
                pool.cached(CacheKey::Standings, |data| {
                    loaded_tx.send(()).unwrap();
                    std::thread::sleep(Duration::from_millis(100));
                    Ok(data.participants.len())
                })
                .unwrap();
            });

            // Commit while the reader sits between its load and its cache write.
            loaded_rx.recv().unwrap();
            pool.transact(&[CacheKey::Standings], |data| {
                data.participants.pop();
                Ok(())
            })
            .unwrap();
        });

        let count = pool
            .cached(CacheKey::Standings, |data| Ok(data.participants.len()))
            .unwrap();
        assert_eq!(count, 1);
    }
}
