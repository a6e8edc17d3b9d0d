use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::PoolContext;
use crate::cache::CacheKey;
use crate::model::{CarNumber, Driver, Participant, Race, RaceId, RaceStatus, Rollover};
use crate::scoring::ScoringCategory;
use crate::PoolError;

/// Descriptive fields of a race, as given on create and update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceFields {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub special: bool,
    pub extra_drivers: Option<String>,
}

impl RaceFields {
    fn validate(&self, errors: &mut Vec<String>) {
        if self.name.trim().is_empty() {
            errors.push("name: must not be empty".to_string());
        }
    }

    fn apply(&self, race: &mut Race) {
        race.name = self.name.trim().to_string();
        race.date = self.date;
        race.special = self.special;
        race.extra_drivers = self
            .extra_drivers
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }
}

/// One recorded winner, resolved to a driver name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultLine {
    pub category: ScoringCategory,
    pub car_number: CarNumber,
    pub driver_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceDetail {
    pub race: Race,
    /// Empty until results are submitted.
    pub results: Vec<ResultLine>,
}

impl PoolContext {
    pub fn create_race(&self, race_number: u32, fields: RaceFields) -> Result<Race, PoolError> {
        let mut errors = Vec::new();
        if race_number == 0 {
            errors.push("race_number: must be at least 1".to_string());
        }
        fields.validate(&mut errors);
        if !errors.is_empty() {
            return Err(PoolError::Validation(errors));
        }

        self.transact(&[CacheKey::Races], |data| {
            if let Some(existing) = data.races.iter().find(|r| r.race_number == race_number) {
                return Err(PoolError::validation(format!(
                    "race_number: {} is already used by '{}'",
                    race_number, existing.name
                )));
            }

            let mut race = Race {
                id: data.next_race_id(),
                name: String::new(),
                race_number,
                date: None,
                special: false,
                status: RaceStatus::Upcoming,
                rollover: Rollover::default(),
                extra_drivers: None,
                results: None,
                created_at: Utc::now(),
            };
            fields.apply(&mut race);
            data.races.push(race.clone());

            tracing::info!(race_id = race.id, race_number, "race created");
            Ok(race)
        })
    }

    /// Change a race's descriptive fields and special flag. Race number,
    /// status and rollover are never touched here.
    pub fn update_race(&self, race_id: RaceId, fields: RaceFields) -> Result<Race, PoolError> {
        let mut errors = Vec::new();
        fields.validate(&mut errors);
        if !errors.is_empty() {
            return Err(PoolError::Validation(errors));
        }

        self.transact(&[CacheKey::Races], |data| {
            let race = data
                .race_mut(race_id)
                .ok_or(PoolError::RaceNotFound(race_id))?;
            fields.apply(race);
            Ok(race.clone())
        })
    }

    /// All races in season order.
    pub fn list_races(&self) -> Result<Vec<Race>, PoolError> {
        self.cached(CacheKey::Races, |data| {
            let mut races = data.races;
            races.sort_by_key(|r| r.race_number);
            Ok(races)
        })
    }

    pub fn race_detail(&self, race_id: RaceId) -> Result<RaceDetail, PoolError> {
        let data = self.snapshot()?;
        let race = data
            .race(race_id)
            .cloned()
            .ok_or(PoolError::RaceNotFound(race_id))?;

        let results = match &race.results {
            Some(winners) => ScoringCategory::ALL
                .iter()
                .map(|&category| {
                    let car = winners.get(category);
                    ResultLine {
                        category,
                        car_number: car.clone(),
                        driver_name: data
                            .driver_by_car(car)
                            .map(|d| d.name.clone())
                            .unwrap_or_else(|| "Unknown".to_string()),
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(RaceDetail { race, results })
    }

    /// Participants by name.
    pub fn participants(&self) -> Result<Vec<Participant>, PoolError> {
        let mut participants = self.snapshot()?.participants;
        participants.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(participants)
    }

    /// Drivers by car number.
    pub fn drivers(&self) -> Result<Vec<Driver>, PoolError> {
        self.cached(CacheKey::Drivers, |data| {
            let mut drivers = data.drivers;
            drivers.sort_by(|a, b| a.car_number.cmp(&b.car_number));
            Ok(drivers)
        })
    }
}
