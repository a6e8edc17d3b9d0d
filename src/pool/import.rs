use chrono::Utc;
use serde::Serialize;

use super::PoolContext;
use crate::cache::CacheKey;
use crate::model::{CarNumber, Driver, Participant, Race, RaceStatus, Rollover};
use crate::roster::{validate_roster, Roster};
use crate::PoolError;

/// Counts of what an import created or changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub participants_added: usize,
    pub drivers_added: usize,
    pub drivers_updated: usize,
    pub races_added: usize,
    pub races_updated: usize,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl PoolContext {
    /// Load participants, drivers and races from a roster.
    ///
    /// Participants are matched by name, drivers by car number and races by
    /// race number. Matches are updated in place, so importing the same
    /// roster twice changes nothing the second time.
    pub fn import_roster(&self, roster: &Roster) -> Result<ImportSummary, PoolError> {
        validate_roster(roster).map_err(PoolError::Validation)?;

        // Parsed above, cannot fail here.
        let cars: Vec<CarNumber> = roster
            .drivers
            .iter()
            .filter_map(|d| CarNumber::parse(&d.car_number).ok())
            .collect();

        self.transact(
            &[CacheKey::Standings, CacheKey::Races, CacheKey::Drivers],
            |data| {
                let mut errors = Vec::new();
                for (i, race) in roster.races.iter().enumerate() {
                    let name = race.name.trim();
                    if let Some(existing) = data
                        .races
                        .iter()
                        .find(|r| r.race_number == race.race_number && r.name != name)
                    {
                        errors.push(format!(
                            "races[{}].race_number: {} is already used by '{}'",
                            i, race.race_number, existing.name
                        ));
                    }
                }
                if !errors.is_empty() {
                    return Err(PoolError::Validation(errors));
                }

                let mut summary = ImportSummary::default();
                let now = Utc::now();

                for name in &roster.participants {
                    let name = name.trim();
                    if data.participants.iter().any(|p| p.name == name) {
                        continue;
                    }
                    let id = data.next_participant_id();
                    data.participants.push(Participant {
                        id,
                        name: name.to_string(),
                        created_at: now,
                    });
                    summary.participants_added += 1;
                }

                for (entry, car) in roster.drivers.iter().zip(cars) {
                    let name = entry.name.trim().to_string();
                    let team_name = non_empty(&entry.team_name);
                    let manufacturer = non_empty(&entry.manufacturer);

                    match data.drivers.iter_mut().find(|d| d.car_number == car) {
                        Some(driver) => {
                            let changed = driver.name != name
                                || driver.team_name != team_name
                                || driver.manufacturer != manufacturer
                                || driver.chartered != entry.chartered;
                            if changed {
                                driver.name = name;
                                driver.team_name = team_name;
                                driver.manufacturer = manufacturer;
                                driver.chartered = entry.chartered;
                                summary.drivers_updated += 1;
                            }
                        }
                        None => {
                            let id = data.next_driver_id();
                            data.drivers.push(Driver {
                                id,
                                name,
                                car_number: car,
                                team_name,
                                manufacturer,
                                chartered: entry.chartered,
                                created_at: now,
                            });
                            summary.drivers_added += 1;
                        }
                    }
                }

                for entry in &roster.races {
                    match data.race_by_number_mut(entry.race_number) {
                        Some(race) => {
                            if race.date != entry.date || race.special != entry.special {
                                race.date = entry.date;
                                race.special = entry.special;
                                summary.races_updated += 1;
                            }
                        }
                        None => {
                            let id = data.next_race_id();
                            data.races.push(Race {
                                id,
                                name: entry.name.trim().to_string(),
                                race_number: entry.race_number,
                                date: entry.date,
                                special: entry.special,
                                status: RaceStatus::Upcoming,
                                rollover: Rollover::default(),
                                extra_drivers: None,
                                results: None,
                                created_at: now,
                            });
                            summary.races_added += 1;
                        }
                    }
                }

                tracing::info!(
                    participants = summary.participants_added,
                    drivers = summary.drivers_added,
                    races = summary.races_added,
                    "roster imported"
                );
                Ok(summary)
            },
        )
    }
}
