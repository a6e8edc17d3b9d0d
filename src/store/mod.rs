mod json;
mod memory;

pub use json::{get_data_path, JsonFileStore};
pub use memory::MemoryStore;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;

use crate::model::{
    CarNumber, Driver, DriverId, Participant, ParticipantId, Race, RaceId, Team, TeamId,
};
use crate::scoring::TEAM_SIZE;
use crate::PoolError;

pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Readers that must not interleave with a commit.
    Shared,
    /// A whole load-mutate-commit transaction.
    Exclusive,
}

/// A lock on the store, released when dropped.
#[derive(Debug, Default)]
pub struct StoreLock {
    _file: Option<File>,
}

impl StoreLock {
    pub(crate) fn held(file: File) -> Self {
        Self { _file: Some(file) }
    }
}

/// Persistence collaborator for the pool.
///
/// `load` returns an owned snapshot; `commit` replaces the stored pool with it
/// as a whole. Partial writes must never become visible.
pub trait Store: Send + Sync {
    fn load(&self) -> Result<PoolData>;
    fn commit(&self, data: &PoolData) -> Result<()>;

    /// Lock the store against other handles to the same data, including
    /// other processes. Stores private to one handle need no lock.
    fn lock(&self, _mode: LockMode) -> Result<StoreLock> {
        Ok(StoreLock::default())
    }
}

/// Everything the pool persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolData {
    pub version: u32,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub races: Vec<Race>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Default for PoolData {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolData {
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            participants: Vec::new(),
            drivers: Vec::new(),
            races: Vec::new(),
            teams: Vec::new(),
        }
    }

    pub fn race(&self, id: RaceId) -> Option<&Race> {
        self.races.iter().find(|r| r.id == id)
    }

    pub fn race_mut(&mut self, id: RaceId) -> Option<&mut Race> {
        self.races.iter_mut().find(|r| r.id == id)
    }

    pub fn race_by_number_mut(&mut self, race_number: u32) -> Option<&mut Race> {
        self.races.iter_mut().find(|r| r.race_number == race_number)
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn driver(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == id)
    }

    pub fn driver_by_car(&self, car: &CarNumber) -> Option<&Driver> {
        self.drivers.iter().find(|d| &d.car_number == car)
    }

    pub fn teams_for_race(&self, race_id: RaceId) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(move |t| t.race_id == race_id)
    }

    pub fn chartered_cars(&self) -> HashSet<CarNumber> {
        self.drivers
            .iter()
            .filter(|d| d.chartered)
            .map(|d| d.car_number.clone())
            .collect()
    }

    /// Resolve a team's drivers to car numbers.
    pub fn team_cars(&self, team: &Team) -> Result<[CarNumber; TEAM_SIZE], PoolError> {
        let mut cars: Vec<CarNumber> = Vec::with_capacity(TEAM_SIZE);
        for driver_id in team.drivers {
            let driver = self.driver(driver_id).ok_or_else(|| {
                PoolError::Storage(anyhow::anyhow!(
                    "team {} references unknown driver {}",
                    team.id,
                    driver_id
                ))
            })?;
            cars.push(driver.car_number.clone());
        }
        cars.try_into().map_err(|_| {
            PoolError::Storage(anyhow::anyhow!("team {} does not have {} drivers", team.id, TEAM_SIZE))
        })
    }

    pub fn next_participant_id(&self) -> ParticipantId {
        self.participants.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    pub fn next_driver_id(&self) -> DriverId {
        self.drivers.iter().map(|d| d.id).max().unwrap_or(0) + 1
    }

    pub fn next_race_id(&self) -> RaceId {
        self.races.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    pub fn next_team_id(&self) -> TeamId {
        self.teams.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }
}
