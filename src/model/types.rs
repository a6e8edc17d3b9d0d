use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::car::CarNumber;
use crate::scoring::{ScoringCategory, SPECIAL_MULTIPLIER, TEAM_SIZE};

pub type ParticipantId = u32;
pub type DriverId = u32;
pub type RaceId = u32;
pub type TeamId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub car_number: CarNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Whether this car is one of the pool-eligible entries.
    pub chartered: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    Upcoming,
    InProgress,
    Completed,
}

impl RaceStatus {
    /// Status only moves forward: upcoming -> in_progress -> completed.
    pub fn can_advance_to(self, next: RaceStatus) -> bool {
        self.rank() <= next.rank()
    }

    fn rank(self) -> u8 {
        match self {
            RaceStatus::Upcoming => 0,
            RaceStatus::InProgress => 1,
            RaceStatus::Completed => 2,
        }
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RaceStatus::Upcoming => "upcoming",
            RaceStatus::InProgress => "in_progress",
            RaceStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Points carried into a race, one accumulator per scoring category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollover {
    pub first: u32,
    pub second: u32,
    pub last: u32,
    pub stage1: u32,
    pub stage2: u32,
}

impl Rollover {
    pub fn get(&self, category: ScoringCategory) -> u32 {
        match category {
            ScoringCategory::FirstPlace => self.first,
            ScoringCategory::SecondPlace => self.second,
            ScoringCategory::LastPlace => self.last,
            ScoringCategory::Stage1Winner => self.stage1,
            ScoringCategory::Stage2Winner => self.stage2,
        }
    }

    pub fn set(&mut self, category: ScoringCategory, points: u32) {
        let slot = match category {
            ScoringCategory::FirstPlace => &mut self.first,
            ScoringCategory::SecondPlace => &mut self.second,
            ScoringCategory::LastPlace => &mut self.last,
            ScoringCategory::Stage1Winner => &mut self.stage1,
            ScoringCategory::Stage2Winner => &mut self.stage2,
        };
        *slot = points;
    }

    /// Sum across categories. Widened so five full `u32` pots still add up.
    pub fn total(&self) -> u64 {
        ScoringCategory::ALL
            .iter()
            .map(|c| u64::from(self.get(*c)))
            .sum()
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// The winning car for each scoring category of one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningCars {
    pub first_place: CarNumber,
    pub second_place: CarNumber,
    pub last_place: CarNumber,
    pub stage1_winner: CarNumber,
    pub stage2_winner: CarNumber,
}

impl WinningCars {
    pub fn get(&self, category: ScoringCategory) -> &CarNumber {
        match category {
            ScoringCategory::FirstPlace => &self.first_place,
            ScoringCategory::SecondPlace => &self.second_place,
            ScoringCategory::LastPlace => &self.last_place,
            ScoringCategory::Stage1Winner => &self.stage1_winner,
            ScoringCategory::Stage2Winner => &self.stage2_winner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub name: String,
    /// Position in the season; rollover flows from N to N + 1.
    pub race_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub special: bool,
    pub status: RaceStatus,
    #[serde(default)]
    pub rollover: Rollover,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_drivers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<WinningCars>,
    pub created_at: DateTime<Utc>,
}

impl Race {
    pub fn multiplier(&self) -> u32 {
        if self.special {
            SPECIAL_MULTIPLIER
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub race_id: RaceId,
    pub participant_id: ParticipantId,
    pub drivers: [DriverId; TEAM_SIZE],
    pub points_earned: u32,
    pub created_at: DateTime<Utc>,
}
