pub mod init;
mod schema;

pub use schema::{CacheSettings, Config};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from(std::env::var("HOME").unwrap_or_default()))
}

/// Get the config directory path (~/.config/race-pool/)
pub fn get_config_dir() -> PathBuf {
    home_dir().join(".config").join("race-pool")
}

/// Get the default config file path (~/.config/race-pool/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Get the platform-appropriate read cache directory
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("race-pool/read-cache"))
        .unwrap_or_else(|| home_dir().join(".cache/race-pool/read-cache"))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    /// Resolved pool data file path.
    pub fn data_path(&self) -> PathBuf {
        self.data_path
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(crate::store::get_data_path)
    }
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/race-pool/config.yaml) and falls back to defaults when that
///   file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    Ok(config)
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref path) = config.data_path {
        if path.as_os_str().is_empty() {
            errors.push("data_path: must not be empty".to_string());
        }
    }

    if config.cache.enabled {
        let ttls = [
            ("standings_ttl_secs", config.cache.standings_ttl_secs),
            ("races_ttl_secs", config.cache.races_ttl_secs),
            ("drivers_ttl_secs", config.cache.drivers_ttl_secs),
        ];
        for (name, ttl) in ttls {
            if ttl == 0 {
                errors.push(format!(
                    "cache.{}: must be greater than zero (or set cache.enabled: false)",
                    name
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
