//! Random team assignment: one shuffle of the driver list, dealt out four at a
//! time in participant order.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::scoring::TEAM_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("no participants to assign drivers to")]
    NoParticipants,
    #[error(
        "{drivers} drivers cannot be split into teams of four for {participants} participants (need exactly {expected})"
    )]
    ShapeMismatch {
        participants: usize,
        drivers: usize,
        expected: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<P, D> {
    pub participant: P,
    pub drivers: [D; TEAM_SIZE],
}

/// Shuffle `drivers` with `rng` and give chunk *i* of four to participant *i*.
///
/// Requires exactly `TEAM_SIZE` drivers per participant, so every driver lands
/// on exactly one team.
pub fn assign_teams<P, D, R>(
    participants: &[P],
    drivers: &[D],
    rng: &mut R,
) -> Result<Vec<Assignment<P, D>>, AssignmentError>
where
    P: Clone,
    D: Clone,
    R: Rng + ?Sized,
{
    if participants.is_empty() {
        return Err(AssignmentError::NoParticipants);
    }
    if drivers.len() != participants.len() * TEAM_SIZE {
        return Err(AssignmentError::ShapeMismatch {
            participants: participants.len(),
            drivers: drivers.len(),
            expected: participants.len() * TEAM_SIZE,
        });
    }

    let mut shuffled = drivers.to_vec();
    shuffled.shuffle(rng);

    Ok(participants
        .iter()
        .zip(shuffled.chunks_exact(TEAM_SIZE))
        .map(|(participant, chunk)| Assignment {
            participant: participant.clone(),
            drivers: std::array::from_fn(|i| chunk[i].clone()),
        })
        .collect())
}
