use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

use super::category::ScoringCategory;
use crate::model::{CarNumber, Rollover, WinningCars};

/// Outcome of one scoring category for one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAward {
    pub category: ScoringCategory,
    pub winner: CarNumber,
    pub chartered: bool,
    /// Base points plus incoming rollover, before any multiplier.
    pub pot: u32,
    /// Points paid to whichever team holds the winner (0 when banked).
    pub available: u32,
    /// Carried to the next race at face value (0 when claimed).
    pub next_rollover: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceAwards {
    pub multiplier: u32,
    /// One entry per category, in [`ScoringCategory::ALL`] order.
    pub categories: [CategoryAward; 5],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardContribution {
    pub category: ScoringCategory,
    pub car_number: CarNumber,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamScore {
    pub points: u32,
    pub breakdown: Vec<AwardContribution>,
}

/// A race whose points no longer fit the pool's point type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AwardOverflow {
    #[error(
        "{}: {base} base points plus {incoming} rolled over is too large to award",
        .category.key()
    )]
    Pot {
        category: ScoringCategory,
        base: u32,
        incoming: u32,
    },
    #[error("{}: {pot} points times {multiplier} is too large to award", .category.key())]
    Multiplied {
        category: ScoringCategory,
        pot: u32,
        multiplier: u32,
    },
    #[error("race pays out more points in total than can be recorded")]
    Total,
}

/// Work out what each category pays this race and what it banks for the next.
///
/// A chartered winner claims `(base + incoming) * multiplier`. Any other winner
/// pays nobody and carries `base + incoming` forward unmultiplied, so a special
/// race only doubles points it actually pays out.
///
/// Fails rather than clamping when a pot, a multiplied pot or the race total
/// would leave `u32`, so every point is either paid or carried.
pub fn calculate_awards(
    incoming: &Rollover,
    multiplier: u32,
    winners: &WinningCars,
    chartered: &HashSet<CarNumber>,
) -> Result<RaceAwards, AwardOverflow> {
    let mut categories = ScoringCategory::ALL.map(|category| {
        let winner = winners.get(category).clone();
        CategoryAward {
            category,
            chartered: chartered.contains(&winner),
            winner,
            pot: 0,
            available: 0,
            next_rollover: 0,
        }
    });

    let mut total = 0u32;
    for award in &mut categories {
        let category = award.category;
        let base = category.base_points();
        award.pot = base
            .checked_add(incoming.get(category))
            .ok_or(AwardOverflow::Pot {
                category,
                base,
                incoming: incoming.get(category),
            })?;

        if award.chartered {
            award.available = award.pot.checked_mul(multiplier).ok_or(
                AwardOverflow::Multiplied {
                    category,
                    pot: award.pot,
                    multiplier,
                },
            )?;
        } else {
            award.next_rollover = award.pot;
        }

        // A team's score is a subset of this sum, so bounding it bounds every team.
        total = total
            .checked_add(award.available)
            .ok_or(AwardOverflow::Total)?;
    }

    Ok(RaceAwards {
        multiplier,
        categories,
    })
}

impl RaceAwards {
    pub fn award(&self, category: ScoringCategory) -> &CategoryAward {
        &self.categories[category.index()]
    }

    pub fn next_rollover(&self) -> Rollover {
        let mut rollover = Rollover::default();
        for award in &self.categories {
            rollover.set(award.category, award.next_rollover);
        }
        rollover
    }

    /// Points this race pays out in total, across all categories.
    pub fn total_available(&self) -> u32 {
        self.categories.iter().map(|a| a.available).sum()
    }

    /// Score one team's cars against this race's awards.
    ///
    /// Every category whose winner the team holds adds its available points,
    /// so one car winning two categories scores both.
    pub fn score_team(&self, cars: &[CarNumber]) -> TeamScore {
        let mut score = TeamScore::default();
        for award in &self.categories {
            if cars.contains(&award.winner) {
                score.points += award.available;
                score.breakdown.push(AwardContribution {
                    category: award.category,
                    car_number: award.winner.clone(),
                    points: award.available,
                });
            }
        }
        score
    }
}
