use super::{PoolData, Store};
use anyhow::Result;
use std::sync::Mutex;

/// Keeps the pool in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<PoolData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: PoolData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<PoolData> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        Ok(data.clone())
    }

    fn commit(&self, data: &PoolData) -> Result<()> {
        let mut stored = self.data.lock().unwrap_or_else(|e| e.into_inner());
        *stored = data.clone();
        Ok(())
    }
}
