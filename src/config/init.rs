use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, CacheSettings, Config};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

fn prompt_ttl(message: &str, default: u64) -> Result<u64> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<u64>() {
            Ok(v) if v > 0 => return Ok(v),
            _ => println!("  Invalid: must be a whole number of seconds above zero. Try again."),
        }
    }
}

/// Render a config as YAML.
pub fn render_config(config: &Config) -> Result<String> {
    serde_saphyr::to_string(config).map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Race Pool Configuration");
    println!("=======================");
    println!();

    // 1. Where the pool lives
    println!("The pool (participants, drivers, races, teams) is stored in a single JSON file.");
    let default_data = crate::store::get_data_path();
    let data_str = prompt_with_default("Pool data file", &default_data.display().to_string())?;
    let data_path = PathBuf::from(&data_str);

    // 2. Read cache
    println!();
    println!("Standings, races and drivers can be served from a short-lived cache.");
    let defaults = CacheSettings::default();
    let enabled = prompt_yes_no("Enable the read cache?", true)?;
    let cache = if enabled {
        CacheSettings {
            enabled,
            standings_ttl_secs: prompt_ttl("Standings TTL (seconds)", defaults.standings_ttl_secs)?,
            races_ttl_secs: prompt_ttl("Races TTL (seconds)", defaults.races_ttl_secs)?,
            drivers_ttl_secs: prompt_ttl("Drivers TTL (seconds)", defaults.drivers_ttl_secs)?,
        }
    } else {
        CacheSettings {
            enabled: false,
            ..defaults
        }
    };

    // 3. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        data_path: (data_path != default_data).then_some(data_path),
        cache,
    };
    let yaml = render_config(&config)?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Next: `race-pool import-roster roster.yaml` to load participants, drivers and races.");

    Ok(())
}
