//! Season roster file: the participants, drivers and race calendar loaded in
//! one go at the start of a season.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::model::CarNumber;

/// Example YAML:
/// ```yaml
/// participants: [Avery, Blake]
/// drivers:
///   - name: Kyle Larson
///     car_number: "5"
///     team_name: Hendrick Motorsports
///     manufacturer: Chevrolet
///   - name: Open Entry
///     car_number: "66"
///     chartered: false
/// races:
///   - race_number: 1
///     name: Daytona 500
///     date: 2026-02-15
///     special: true
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Roster {
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub drivers: Vec<RosterDriver>,
    #[serde(default)]
    pub races: Vec<RosterRace>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RosterDriver {
    pub name: String,
    /// Quote numbers with leading zeros ("00") so YAML keeps them as text.
    pub car_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default = "default_chartered")]
    pub chartered: bool,
}

fn default_chartered() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RosterRace {
    pub race_number: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub special: bool,
}

/// Load a roster from a YAML file.
pub fn load_roster(path: &Path) -> Result<Roster> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file at {}", path.display()))?;

    let roster: Roster = serde_saphyr::from_str(&content).with_context(|| {
        format!("Failed to parse roster: invalid YAML in {}", path.display())
    })?;

    Ok(roster)
}

/// Validate a roster on its own, before it is compared with the pool.
/// Returns all validation errors at once (not just the first).
pub fn validate_roster(roster: &Roster) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for (i, name) in roster.participants.iter().enumerate() {
        let name = name.trim();
        if name.is_empty() {
            errors.push(format!("participants[{}]: name must not be empty", i));
        } else if !names.insert(name) {
            errors.push(format!("participants[{}]: duplicate participant '{}'", i, name));
        }
    }

    let mut cars = HashSet::new();
    for (i, driver) in roster.drivers.iter().enumerate() {
        if driver.name.trim().is_empty() {
            errors.push(format!("drivers[{}].name: must not be empty", i));
        }
        match CarNumber::parse(&driver.car_number) {
            Ok(car) => {
                if !cars.insert(car.clone()) {
                    errors.push(format!("drivers[{}].car_number: duplicate car number '{}'", i, car));
                }
            }
            Err(e) => errors.push(format!(
                "drivers[{}].car_number: invalid car number '{}' - {}",
                i, driver.car_number, e
            )),
        }
    }

    let mut race_numbers = HashSet::new();
    for (i, race) in roster.races.iter().enumerate() {
        if race.name.trim().is_empty() {
            errors.push(format!("races[{}].name: must not be empty", i));
        }
        if race.race_number == 0 {
            errors.push(format!("races[{}].race_number: must be at least 1", i));
        } else if !race_numbers.insert(race.race_number) {
            errors.push(format!(
                "races[{}].race_number: duplicate race number {}",
                i, race.race_number
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
