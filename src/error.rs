use thiserror::Error;

use crate::model::RaceId;

/// Errors returned by pool operations.
///
/// Validation errors are raised before any state is touched. Conflicts mean
/// the request was well-formed but the pool is not in a state that allows it.
/// Storage errors abandon the whole transaction.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid input: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("teams already generated for race {race_id}")]
    TeamsAlreadyGenerated { race_id: RaceId },

    #[error("race {0} not found")]
    RaceNotFound(RaceId),

    #[error("race {race_id} is already completed")]
    RaceCompleted { race_id: RaceId },

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl PoolError {
    pub fn validation(message: impl Into<String>) -> Self {
        PoolError::Validation(vec![message.into()])
    }

    /// True for errors caused by pool state rather than by the request itself.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            PoolError::TeamsAlreadyGenerated { .. }
                | PoolError::RaceNotFound(_)
                | PoolError::RaceCompleted { .. }
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PoolError::Validation(_))
    }
}
