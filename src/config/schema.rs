use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration.
///
/// Example YAML:
/// ```yaml
/// data_path: ~/pool/pool.json
/// cache:
///   enabled: true
///   standings_ttl_secs: 60
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Pool data file (default: ~/.config/race-pool/pool.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    #[serde(default)]
    pub cache: CacheSettings,
}

/// Read cache for standings, races and drivers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Standings change after every results entry.
    #[serde(default = "default_standings_ttl")]
    pub standings_ttl_secs: u64,

    #[serde(default = "default_races_ttl")]
    pub races_ttl_secs: u64,

    /// Drivers rarely change during a season.
    #[serde(default = "default_drivers_ttl")]
    pub drivers_ttl_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_standings_ttl() -> u64 {
    60
}

fn default_races_ttl() -> u64 {
    300
}

fn default_drivers_ttl() -> u64 {
    86400
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            standings_ttl_secs: default_standings_ttl(),
            races_ttl_secs: default_races_ttl(),
            drivers_ttl_secs: default_drivers_ttl(),
        }
    }
}
