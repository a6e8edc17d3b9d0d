use super::{LockMode, PoolData, Store, StoreLock, STORE_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Get the default pool data file path (~/.config/race-pool/pool.json)
pub fn get_data_path() -> PathBuf {
    crate::config::get_config_dir().join("pool.json")
}

/// Pool persisted as a single JSON document.
///
/// Every commit rewrites the whole document through an atomic rename, so a
/// reader sees either the previous pool or the new one, never a mix. Locks
/// are advisory and taken on a `<file>.lock` sibling, since the document
/// itself is replaced on every commit.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory at {}", parent.display())
                })?;
            }
        }
        Ok(())
    }
}

impl Store for JsonFileStore {
    /// If the file doesn't exist, returns a new empty pool.
    /// If the file exists but has an unsupported version, returns an error.
    fn load(&self) -> Result<PoolData> {
        if !self.path.exists() {
            return Ok(PoolData::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open pool file at {}", self.path.display()))?;

        let data: PoolData = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to load pool from {}", self.path.display()))?;

        if data.version != STORE_VERSION {
            anyhow::bail!("Unsupported pool file version: {}", data.version);
        }

        Ok(data)
    }

    fn commit(&self, data: &PoolData) -> Result<()> {
        self.ensure_parent_dir()?;

        let mut file = AtomicWriteFile::open(&self.path)
            .with_context(|| format!("Failed to open atomic write file at {}", self.path.display()))?;

        serde_json::to_writer_pretty(&mut file, data).context("Failed to serialize pool")?;

        file.commit().context("Failed to save pool")?;

        Ok(())
    }

    /// Blocks until the lock is granted.
    fn lock(&self, mode: LockMode) -> Result<StoreLock> {
        self.ensure_parent_dir()?;
        let path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file at {}", path.display()))?;

        match mode {
            LockMode::Shared => file.lock_shared(),
            LockMode::Exclusive => file.lock(),
        }
        .with_context(|| format!("Failed to lock {}", path.display()))?;

        tracing::debug!(path = %path.display(), ?mode, "pool file locked");
        Ok(StoreLock::held(file))
    }
}
