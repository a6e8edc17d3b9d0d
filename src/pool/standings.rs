use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::PoolContext;
use crate::cache::CacheKey;
use crate::model::{ParticipantId, RaceId, RaceStatus};
use crate::store::PoolData;
use crate::PoolError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Sequential position, starting at 1. Tied participants still get
    /// distinct ranks.
    pub rank: u32,
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub total_points: u64,
    pub races_completed: u32,
}

/// Season standings from completed races only.
///
/// Ordered by total points descending, then name ascending.
pub fn rank_standings(data: &PoolData) -> Vec<Standing> {
    let completed: HashSet<RaceId> = data
        .races
        .iter()
        .filter(|r| r.status == RaceStatus::Completed)
        .map(|r| r.id)
        .collect();

    let mut totals: HashMap<ParticipantId, (u64, u32)> = HashMap::new();
    for team in data.teams.iter().filter(|t| completed.contains(&t.race_id)) {
        let entry = totals.entry(team.participant_id).or_default();
        entry.0 += u64::from(team.points_earned);
        entry.1 += 1;
    }

    let mut standings: Vec<Standing> = data
        .participants
        .iter()
        .map(|p| {
            let (total_points, races_completed) = totals.get(&p.id).copied().unwrap_or_default();
            Standing {
                rank: 0,
                participant_id: p.id,
                participant_name: p.name.clone(),
                total_points,
                races_completed,
            }
        })
        .collect();

    standings.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.participant_name.cmp(&b.participant_name))
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });
    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = i as u32 + 1;
    }
    standings
}

impl PoolContext {
    pub fn compute_standings(&self) -> Result<Vec<Standing>, PoolError> {
        self.cached(CacheKey::Standings, |data| Ok(rank_standings(&data)))
    }
}
