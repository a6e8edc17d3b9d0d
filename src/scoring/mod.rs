pub mod category;
pub mod engine;
pub mod validation;

pub use category::{ScoringCategory, SPECIAL_MULTIPLIER, TEAM_SIZE};
pub use engine::{
    calculate_awards, AwardContribution, AwardOverflow, CategoryAward, RaceAwards, TeamScore,
};
pub use validation::{validate_results, ResultsInput};
