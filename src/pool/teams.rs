use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use super::PoolContext;
use crate::assignment::assign_teams;
use crate::cache::CacheKey;
use crate::model::{CarNumber, DriverId, ParticipantId, RaceId, RaceStatus, Team, TeamId};
use crate::PoolError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDriver {
    pub driver_id: DriverId,
    pub name: String,
    pub car_number: Option<CarNumber>,
}

/// A team with its participant and drivers resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDetail {
    pub team_id: TeamId,
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub drivers: Vec<TeamDriver>,
    pub points_earned: u32,
}

impl PoolContext {
    /// Deal the chartered drivers out to every participant, four each.
    ///
    /// Participants are taken in id order and drivers in car number order
    /// before the shuffle, so a given RNG state always yields the same teams.
    pub fn generate_teams<R>(&self, race_id: RaceId, rng: &mut R) -> Result<Vec<Team>, PoolError>
    where
        R: Rng + ?Sized,
    {
        self.transact(&[CacheKey::Races, CacheKey::Standings], |data| {
            let race = data.race(race_id).ok_or(PoolError::RaceNotFound(race_id))?;
            if race.status == RaceStatus::Completed {
                return Err(PoolError::RaceCompleted { race_id });
            }
            if data.teams_for_race(race_id).next().is_some() {
                return Err(PoolError::TeamsAlreadyGenerated { race_id });
            }

            let mut participants: Vec<ParticipantId> =
                data.participants.iter().map(|p| p.id).collect();
            participants.sort_unstable();

            let mut chartered: Vec<_> = data.drivers.iter().filter(|d| d.chartered).collect();
            chartered.sort_by(|a, b| a.car_number.cmp(&b.car_number));
            let drivers: Vec<DriverId> = chartered.iter().map(|d| d.id).collect();

            let assignments = assign_teams(&participants, &drivers, rng)
                .map_err(|e| PoolError::validation(e.to_string()))?;

            let first_id = data.next_team_id();
            let now = Utc::now();
            let teams: Vec<Team> = assignments
                .into_iter()
                .zip(first_id..)
                .map(|(assignment, id)| Team {
                    id,
                    race_id,
                    participant_id: assignment.participant,
                    drivers: assignment.drivers,
                    points_earned: 0,
                    created_at: now,
                })
                .collect();
            data.teams.extend(teams.iter().cloned());

            if let Some(race) = data.race_mut(race_id) {
                if race.status.can_advance_to(RaceStatus::InProgress) {
                    race.status = RaceStatus::InProgress;
                }
            }

            tracing::info!(race_id, teams = teams.len(), "teams generated");
            Ok(teams)
        })
    }

    /// Teams of a race, best first. Ties are ordered by participant name.
    pub fn race_teams(&self, race_id: RaceId) -> Result<Vec<TeamDetail>, PoolError> {
        let data = self.snapshot()?;
        if data.race(race_id).is_none() {
            return Err(PoolError::RaceNotFound(race_id));
        }

        let mut details: Vec<TeamDetail> = data
            .teams_for_race(race_id)
            .map(|team| TeamDetail {
                team_id: team.id,
                participant_id: team.participant_id,
                participant_name: data
                    .participant(team.participant_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                drivers: team
                    .drivers
                    .iter()
                    .map(|&driver_id| match data.driver(driver_id) {
                        Some(d) => TeamDriver {
                            driver_id,
                            name: d.name.clone(),
                            car_number: Some(d.car_number.clone()),
                        },
                        None => TeamDriver {
                            driver_id,
                            name: "Unknown".to_string(),
                            car_number: None,
                        },
                    })
                    .collect(),
                points_earned: team.points_earned,
            })
            .collect();

        details.sort_by(|a, b| {
            b.points_earned
                .cmp(&a.points_earned)
                .then_with(|| a.participant_name.cmp(&b.participant_name))
        });
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReadCache;
    use crate::pool::test_support::{driver, participant, small_pool};
    use crate::store::{MemoryStore, PoolData};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn pool_with(data: PoolData) -> PoolContext {
        PoolContext::new(MemoryStore::with_data(data), ReadCache::disabled())
    }

    fn team(id: TeamId, participant_id: ParticipantId, drivers: [DriverId; 4], points: u32) -> Team {
        Team {
            id,
            race_id: 1,
            participant_id,
            drivers,
            points_earned: points,
            created_at: Utc::now(),
        }
    }

    fn full_field() -> PoolData {
        let mut data = PoolData::new();
        data.participants = (1..=9).map(|i| participant(i, &format!("P{}", i))).collect();
        data.drivers = (1..=36).map(|i| driver(i, &i.to_string(), true)).collect();
        data.drivers.push(driver(37, "66", false));
        data.races = small_pool(2).races;
        data
    }

    #[test]
    fn test_nine_participants_get_all_36_chartered_drivers() {
        let pool = pool_with(full_field());
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let teams = pool.generate_teams(1, &mut rng).unwrap();
        assert_eq!(teams.len(), 9);

        let mut seen = HashSet::new();
        for team in &teams {
            assert_eq!(team.race_id, 1);
            for driver_id in team.drivers {
                assert!(seen.insert(driver_id), "driver {} dealt twice", driver_id);
            }
        }
        assert_eq!(seen.len(), 36);
        assert!(!seen.contains(&37));

        let participants: HashSet<_> = teams.iter().map(|t| t.participant_id).collect();
        assert_eq!(participants.len(), 9);
    }

    #[test]
    fn test_generation_moves_race_in_progress() {
        let pool = pool_with(full_field());
        pool.generate_teams(1, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();

        let data = pool.snapshot().unwrap();
        assert_eq!(data.race(1).unwrap().status, RaceStatus::InProgress);
        assert_eq!(data.race(2).unwrap().status, RaceStatus::Upcoming);
    }

    #[test]
    fn test_same_seed_same_teams() {
        let a = pool_with(full_field())
            .generate_teams(1, &mut ChaCha8Rng::seed_from_u64(99))
            .unwrap();
        let b = pool_with(full_field())
            .generate_teams(1, &mut ChaCha8Rng::seed_from_u64(99))
            .unwrap();

        let drivers = |teams: &[Team]| teams.iter().map(|t| t.drivers).collect::<Vec<_>>();
        assert_eq!(drivers(&a[..]), drivers(&b[..]));
    }

    #[test]
    fn test_second_generation_is_conflict() {
        let pool = pool_with(full_field());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let first = pool.generate_teams(1, &mut rng).unwrap();

        let err = pool.generate_teams(1, &mut rng).unwrap_err();
        assert!(matches!(err, PoolError::TeamsAlreadyGenerated { race_id: 1 }));

        let stored: Vec<Team> = pool.snapshot().unwrap().teams;
        assert_eq!(stored, first);
    }

    #[test]
    fn test_completed_race_is_refused() {
        let mut data = full_field();
        data.races[0].status = RaceStatus::Completed;
        let pool = pool_with(data);

        let err = pool
            .generate_teams(1, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, PoolError::RaceCompleted { race_id: 1 }));
    }

    #[test]
    fn test_missing_race_is_not_found() {
        let pool = pool_with(full_field());
        let err = pool
            .generate_teams(8, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, PoolError::RaceNotFound(8)));
    }

    #[test]
    fn test_wrong_driver_count_is_validation_error() {
        let mut data = full_field();
        data.drivers.retain(|d| d.id != 36);
        let pool = pool_with(data);

        let err = pool
            .generate_teams(1, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("need exactly 36"));
        assert!(pool.snapshot().unwrap().teams.is_empty());
        assert_eq!(pool.snapshot().unwrap().race(1).unwrap().status, RaceStatus::Upcoming);
    }

    #[test]
    fn test_no_participants_is_validation_error() {
        let mut data = full_field();
        data.participants.clear();
        let err = pool_with(data)
            .generate_teams(1, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_race_teams_sorted_by_points_then_name() {
        let mut data = small_pool(1);
        data.participants.push(participant(3, "Casey"));
        data.teams = vec![
            team(1, 1, [1, 2, 3, 4], 25),
            team(2, 2, [5, 6, 7, 8], 25),
            team(3, 3, [9, 40, 41, 42], 135),
        ];
        let pool = pool_with(data);

        let teams = pool.race_teams(1).unwrap();
        let names: Vec<&str> = teams.iter().map(|t| t.participant_name.as_str()).collect();
        assert_eq!(names, vec!["Casey", "Avery", "Blake"]);

        assert_eq!(teams[0].drivers[0].car_number.as_ref().map(|c| c.as_str()), Some("99"));
        assert_eq!(teams[0].drivers[1].name, "Unknown");
        assert!(teams[0].drivers[1].car_number.is_none());
    }

    #[test]
    fn test_race_teams_missing_race() {
        let pool = pool_with(small_pool(1));
        assert!(matches!(pool.race_teams(3), Err(PoolError::RaceNotFound(3))));
        assert!(pool.race_teams(1).unwrap().is_empty());
    }
}
