use serde::Serialize;

use super::PoolContext;
use crate::cache::CacheKey;
use crate::model::{ParticipantId, RaceId, RaceStatus, Rollover, TeamId};
use crate::scoring::{
    calculate_awards, validate_results, AwardContribution, RaceAwards, ResultsInput, TeamScore,
};
use crate::PoolError;

/// Where the banked points of a race ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RolloverTarget {
    Written { race_id: RaceId, race_number: u32 },
    /// No race with the next race number exists yet.
    Dropped { race_number: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPoints {
    pub team_id: TeamId,
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub points: u32,
    pub breakdown: Vec<AwardContribution>,
}

/// Everything a results submission changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsSubmission {
    pub race_id: RaceId,
    pub race_number: u32,
    pub awards: RaceAwards,
    /// Best first, ties by participant name.
    pub teams: Vec<TeamPoints>,
    pub next_rollover: Rollover,
    pub target: RolloverTarget,
}

impl PoolContext {
    /// Record a race's winners, rescore its teams and seed the next race's
    /// rollover.
    ///
    /// Submitting again for the same race recomputes from the race's incoming
    /// rollover, replacing team points and the next race's rollover rather
    /// than adding to them.
    pub fn submit_results(
        &self,
        race_id: RaceId,
        input: &ResultsInput,
    ) -> Result<ResultsSubmission, PoolError> {
        let winners = validate_results(input).map_err(PoolError::Validation)?;

        self.transact(&[CacheKey::Standings, CacheKey::Races], |data| {
            let race = data.race(race_id).ok_or(PoolError::RaceNotFound(race_id))?;
            let race_number = race.race_number;
            let awards = calculate_awards(
                &race.rollover,
                race.multiplier(),
                &winners,
                &data.chartered_cars(),
            )
            .map_err(|e| PoolError::validation(e.to_string()))?;

            let mut scored: Vec<(TeamId, TeamScore)> = Vec::new();
            for team in data.teams_for_race(race_id) {
                let cars = data.team_cars(team)?;
                scored.push((team.id, awards.score_team(&cars)));
            }

            let mut teams = Vec::with_capacity(scored.len());
            for (team_id, score) in scored {
                let Some(team) = data.teams.iter_mut().find(|t| t.id == team_id) else {
                    continue;
                };
                team.points_earned = score.points;
                let participant_id = team.participant_id;
                teams.push(TeamPoints {
                    team_id,
                    participant_id,
                    participant_name: data
                        .participant(participant_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    points: score.points,
                    breakdown: score.breakdown,
                });
            }
            teams.sort_by(|a, b| {
                b.points
                    .cmp(&a.points)
                    .then_with(|| a.participant_name.cmp(&b.participant_name))
            });

            if let Some(race) = data.race_mut(race_id) {
                race.status = RaceStatus::Completed;
                race.results = Some(winners.clone());
            }

            let next_rollover = awards.next_rollover();
            let next_number = race_number.saturating_add(1);
            let next_race = match race_number.checked_add(1) {
                Some(n) => data.race_by_number_mut(n),
                None => None,
            };
            let target = match next_race {
                Some(next) => {
                    next.rollover = next_rollover;
                    RolloverTarget::Written {
                        race_id: next.id,
                        race_number: next.race_number,
                    }
                }
                None => {
                    if !next_rollover.is_zero() {
                        tracing::warn!(
                            race_id,
                            next_race_number = next_number,
                            points = next_rollover.total(),
                            "no race to carry rollover into, dropping it"
                        );
                    }
                    RolloverTarget::Dropped {
                        race_number: next_number,
                    }
                }
            };

            tracing::info!(
                race_id,
                race_number,
                paid = awards.total_available(),
                banked = next_rollover.total(),
                "results recorded"
            );

            Ok(ResultsSubmission {
                race_id,
                race_number,
                awards,
                teams,
                next_rollover,
                target,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReadCache;
    use crate::model::Team;
    use crate::pool::test_support::small_pool;
    use crate::scoring::ScoringCategory;
    use crate::store::{MemoryStore, PoolData};
    use chrono::Utc;

    fn input(first: &str, second: &str, last: &str, s1: &str, s2: &str) -> ResultsInput {
        ResultsInput {
            first_place: Some(first.to_string()),
            second_place: Some(second.to_string()),
            last_place: Some(last.to_string()),
            stage1_winner: Some(s1.to_string()),
            stage2_winner: Some(s2.to_string()),
        }
    }

    /// Blake (id 1) holds cars 1-4, Avery (id 2) holds cars 5-8 in race 1.
    fn pool_with_teams(races: u32) -> PoolContext {
        let mut data: PoolData = small_pool(races);
        let now = Utc::now();
        data.teams = vec![
            Team {
                id: 1,
                race_id: 1,
                participant_id: 1,
                drivers: [1, 2, 3, 4],
                points_earned: 0,
                created_at: now,
            },
            Team {
                id: 2,
                race_id: 1,
                participant_id: 2,
                drivers: [5, 6, 7, 8],
                points_earned: 0,
                created_at: now,
            },
        ];
        PoolContext::new(MemoryStore::with_data(data), ReadCache::disabled())
    }

    #[test]
    fn test_all_chartered_winners_pay_base_points() {
        let pool = pool_with_teams(2);
        let outcome = pool.submit_results(1, &input("1", "5", "2", "6", "1")).unwrap();

        // Blake: 135 + 15 + 25, Avery: 25 + 25
        let points: Vec<(&str, u32)> = outcome
            .teams
            .iter()
            .map(|t| (t.participant_name.as_str(), t.points))
            .collect();
        assert_eq!(points, vec![("Blake", 175), ("Avery", 50)]);
        assert!(outcome.next_rollover.is_zero());
        assert_eq!(
            outcome.target,
            RolloverTarget::Written {
                race_id: 2,
                race_number: 2
            }
        );

        let data = pool.snapshot().unwrap();
        let race = data.race(1).unwrap();
        assert_eq!(race.status, RaceStatus::Completed);
        assert_eq!(race.results.as_ref().unwrap().first_place.as_str(), "1");
    }

    #[test]
    fn test_open_entry_winner_banks_into_next_race() {
        let pool = pool_with_teams(2);
        let outcome = pool.submit_results(1, &input("99", "5", "2", "6", "1")).unwrap();

        let first = outcome.awards.award(ScoringCategory::FirstPlace);
        assert!(!first.chartered);
        assert_eq!(first.available, 0);
        assert_eq!(outcome.next_rollover.first, 135);

        let data = pool.snapshot().unwrap();
        assert_eq!(data.race(2).unwrap().rollover.first, 135);
        assert_eq!(data.race(2).unwrap().rollover.total(), 135);
    }

    #[test]
    fn test_resubmission_replaces_instead_of_adding() {
        let pool = pool_with_teams(2);
        pool.submit_results(1, &input("99", "5", "2", "6", "1")).unwrap();
        let once = pool.snapshot().unwrap();

        pool.submit_results(1, &input("99", "5", "2", "6", "1")).unwrap();
        let twice = pool.snapshot().unwrap();

        assert_eq!(once.teams, twice.teams);
        assert_eq!(once.races, twice.races);
    }

    #[test]
    fn test_correction_clears_previous_rollover() {
        let pool = pool_with_teams(2);
        pool.submit_results(1, &input("99", "5", "2", "6", "1")).unwrap();
        pool.submit_results(1, &input("3", "5", "2", "6", "1")).unwrap();

        let data = pool.snapshot().unwrap();
        assert!(data.race(2).unwrap().rollover.is_zero());
        let blake = data.teams.iter().find(|t| t.participant_id == 1).unwrap();
        assert_eq!(blake.points_earned, 135 + 15 + 25);
    }

    #[test]
    fn test_missing_next_race_drops_rollover() {
        let pool = pool_with_teams(1);
        let outcome = pool.submit_results(1, &input("99", "5", "2", "6", "1")).unwrap();

        assert_eq!(outcome.target, RolloverTarget::Dropped { race_number: 2 });
        assert_eq!(outcome.next_rollover.first, 135);
        assert_eq!(pool.snapshot().unwrap().races.len(), 1);
    }

    #[test]
    fn test_invalid_results_touch_nothing() {
        let pool = pool_with_teams(2);
        let before = pool.snapshot().unwrap();

        let mut bad = input("1", "5", "x", "6", "1");
        bad.stage2_winner = None;
        let err = pool.submit_results(1, &bad).unwrap_err();

        match err {
            PoolError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(pool.snapshot().unwrap(), before);
    }

    #[test]
    fn test_missing_race_is_not_found() {
        let pool = pool_with_teams(1);
        let err = pool.submit_results(4, &input("1", "2", "3", "4", "5")).unwrap_err();
        assert!(matches!(err, PoolError::RaceNotFound(4)));
    }

    #[test]
    fn test_rollover_too_large_to_award_is_rejected_untouched() {
        let mut data = small_pool(2);
        data.races[0].rollover.first = u32::MAX - 100;
        let pool = PoolContext::new(MemoryStore::with_data(data.clone()), ReadCache::disabled());

        let err = pool.submit_results(1, &input("99", "5", "2", "6", "1")).unwrap_err();
        match err {
            PoolError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].starts_with("first_place:"), "{}", errors[0]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(pool.snapshot().unwrap(), data);
    }

    #[test]
    fn test_team_with_unknown_driver_aborts_submission() {
        let mut data = small_pool(2);
        data.teams = vec![Team {
            id: 1,
            race_id: 1,
            participant_id: 1,
            drivers: [1, 2, 3, 500],
            points_earned: 0,
            created_at: Utc::now(),
        }];
        let pool = PoolContext::new(MemoryStore::with_data(data.clone()), ReadCache::disabled());

        let err = pool.submit_results(1, &input("1", "2", "3", "4", "5")).unwrap_err();
        assert!(matches!(err, PoolError::Storage(_)));
        assert_eq!(pool.snapshot().unwrap(), data);
    }
}
