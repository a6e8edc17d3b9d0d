use serde::{Deserialize, Serialize};
use std::fmt;

/// Drivers per team.
pub const TEAM_SIZE: usize = 4;

/// Applied to awarded (not banked) points in a special race.
pub const SPECIAL_MULTIPLIER: u32 = 2;

/// The five ways a car can earn pool points in a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringCategory {
    FirstPlace,
    SecondPlace,
    LastPlace,
    Stage1Winner,
    Stage2Winner,
}

impl ScoringCategory {
    pub const ALL: [ScoringCategory; 5] = [
        ScoringCategory::FirstPlace,
        ScoringCategory::SecondPlace,
        ScoringCategory::LastPlace,
        ScoringCategory::Stage1Winner,
        ScoringCategory::Stage2Winner,
    ];

    /// Position in [`ScoringCategory::ALL`].
    pub fn index(self) -> usize {
        match self {
            ScoringCategory::FirstPlace => 0,
            ScoringCategory::SecondPlace => 1,
            ScoringCategory::LastPlace => 2,
            ScoringCategory::Stage1Winner => 3,
            ScoringCategory::Stage2Winner => 4,
        }
    }

    pub fn base_points(self) -> u32 {
        match self {
            ScoringCategory::FirstPlace => 135,
            ScoringCategory::SecondPlace => 25,
            ScoringCategory::LastPlace => 15,
            ScoringCategory::Stage1Winner => 25,
            ScoringCategory::Stage2Winner => 25,
        }
    }

    /// Field name used in results input and error messages.
    pub fn key(self) -> &'static str {
        match self {
            ScoringCategory::FirstPlace => "first_place",
            ScoringCategory::SecondPlace => "second_place",
            ScoringCategory::LastPlace => "last_place",
            ScoringCategory::Stage1Winner => "stage1_winner",
            ScoringCategory::Stage2Winner => "stage2_winner",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoringCategory::FirstPlace => "1st Place",
            ScoringCategory::SecondPlace => "2nd Place",
            ScoringCategory::LastPlace => "Last Place",
            ScoringCategory::Stage1Winner => "Stage 1",
            ScoringCategory::Stage2Winner => "Stage 2",
        }
    }
}

impl fmt::Display for ScoringCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
