use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::model::{Driver, Participant, Race, RaceStatus};
use crate::pool::{ImportSummary, RaceDetail, ResultsSubmission, RolloverTarget, Standing, TeamDetail};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn status_label(status: RaceStatus, use_colors: bool) -> String {
    let label = format!("{:<11}", status.to_string());
    if !use_colors {
        return label;
    }
    match status {
        RaceStatus::Upcoming => label.dimmed().to_string(),
        RaceStatus::InProgress => label.yellow().to_string(),
        RaceStatus::Completed => label.green().to_string(),
    }
}

/// Format standings as a ranked table.
/// Rank column: 3 chars (fits "99."), points right-aligned 6 chars.
pub fn format_standings(standings: &[Standing], use_colors: bool) -> String {
    if standings.is_empty() {
        return "No participants yet.".to_string();
    }

    standings
        .iter()
        .map(|s| {
            let rank = format!("{:>2}.", s.rank);
            let points = format!("{:>6}", s.total_points);
            let races = format!(
                "({} race{})",
                s.races_completed,
                if s.races_completed == 1 { "" } else { "s" }
            );
            if use_colors {
                format!(
                    "{} {}  {}  {}",
                    rank.dimmed(),
                    points.bold(),
                    s.participant_name,
                    races.dimmed()
                )
            } else {
                format!("{} {}  {}  {}", rank, points, s.participant_name, races)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format standings as tab-separated values for scripting
/// Columns: rank, name, points, races_completed (no headers, no colors)
pub fn format_standings_tsv(standings: &[Standing]) -> String {
    standings
        .iter()
        .map(|s| {
            format!(
                "{}\t{}\t{}\t{}",
                s.rank, s.participant_name, s.total_points, s.races_completed
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per race: number, status, date, name, flags.
pub fn format_race_list(races: &[Race], use_colors: bool) -> String {
    if races.is_empty() {
        return "No races scheduled.".to_string();
    }

    let term_width = get_terminal_width();
    // "#36  " + status (11) + 2 + date (10) + 2
    let fixed_width = 5 + 11 + 2 + 10 + 2;

    races
        .iter()
        .map(|race| {
            let number = format!("#{:<3}", race.race_number);
            let date = race
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "TBD".to_string());
            let name = match term_width {
                Some(width) if width > fixed_width + 20 => truncate(&race.name, width - fixed_width - 20),
                _ => race.name.clone(),
            };

            let mut flags = Vec::new();
            if race.special {
                flags.push("x2".to_string());
            }
            if !race.rollover.is_zero() {
                flags.push(format!("+{} rollover", race.rollover.total()));
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!("  [{}]", flags.join(", "))
            };

            if use_colors {
                format!(
                    "{} {}  {:<10}  {}{}",
                    number.dimmed(),
                    status_label(race.status, true),
                    date,
                    name.bold(),
                    flags.cyan()
                )
            } else {
                format!(
                    "{} {}  {:<10}  {}{}",
                    number,
                    status_label(race.status, false),
                    date,
                    name,
                    flags
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line race view with rollover and recorded results.
pub fn format_race_detail(detail: &RaceDetail, use_colors: bool) -> String {
    let race = &detail.race;
    let title = format!("#{} {}", race.race_number, race.name);
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    lines.push(format!("  Status: {}", race.status));
    if let Some(date) = race.date {
        lines.push(format!("  Date: {}", date.format("%Y-%m-%d")));
    }
    if race.special {
        lines.push("  Special race: awarded points are doubled".to_string());
    }
    if let Some(ref extra) = race.extra_drivers {
        lines.push(format!("  Extra drivers: {}", extra));
    }
    if !race.rollover.is_zero() {
        lines.push(format!(
            "  Rollover in: 1st {} / 2nd {} / last {} / stage 1 {} / stage 2 {}",
            race.rollover.first,
            race.rollover.second,
            race.rollover.last,
            race.rollover.stage1,
            race.rollover.stage2
        ));
    }

    if detail.results.is_empty() {
        lines.push("  No results recorded.".to_string());
    } else {
        lines.push("  Results:".to_string());
        for line in &detail.results {
            lines.push(format!(
                "    {:<11} #{:<4} {}",
                line.category.label(),
                line.car_number,
                line.driver_name
            ));
        }
    }

    lines.join("\n")
}

/// Teams of a race, one block per team.
pub fn format_teams(teams: &[TeamDetail], use_colors: bool) -> String {
    if teams.is_empty() {
        return "No teams generated for this race.".to_string();
    }

    teams
        .iter()
        .map(|team| {
            let drivers = team
                .drivers
                .iter()
                .map(|d| match d.car_number {
                    Some(ref car) => format!("#{} {}", car, d.name),
                    None => d.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            let points = format!("{:>5}", team.points_earned);
            if use_colors {
                format!(
                    "{}  {}\n       {}",
                    points.bold(),
                    team.participant_name.yellow(),
                    drivers.dimmed()
                )
            } else {
                format!("{}  {}\n       {}", points, team.participant_name, drivers)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_drivers(drivers: &[Driver], use_colors: bool) -> String {
    if drivers.is_empty() {
        return "No drivers yet.".to_string();
    }

    drivers
        .iter()
        .map(|d| {
            let car = format!("#{:<4}", d.car_number);
            let team = match (&d.team_name, &d.manufacturer) {
                (Some(t), Some(m)) => format!("  {} ({})", t, m),
                (Some(t), None) => format!("  {}", t),
                (None, Some(m)) => format!("  ({})", m),
                (None, None) => String::new(),
            };
            let open = if d.chartered { "" } else { "  [open]" };
            if use_colors {
                format!("{} {}{}{}", car.cyan(), d.name, team.dimmed(), open.red())
            } else {
                format!("{} {}{}{}", car, d.name, team, open)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_participants(participants: &[Participant]) -> String {
    if participants.is_empty() {
        return "No participants yet.".to_string();
    }

    participants
        .iter()
        .map(|p| format!("{:>3}  {}", p.id, p.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary of a results submission: what each category paid or banked,
/// team totals, and where the rollover went.
pub fn format_submission(outcome: &ResultsSubmission, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let header = if outcome.awards.multiplier > 1 {
        format!(
            "Race #{} results (special, x{})",
            outcome.race_number, outcome.awards.multiplier
        )
    } else {
        format!("Race #{} results", outcome.race_number)
    };
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for award in &outcome.awards.categories {
        let detail = if award.chartered {
            format!("pays {}", award.available)
        } else {
            format!("open entry, {} rolls over", award.next_rollover)
        };
        let detail = if use_colors {
            if award.chartered {
                detail.green().to_string()
            } else {
                detail.yellow().to_string()
            }
        } else {
            detail
        };
        lines.push(format!(
            "  {:<11} #{:<4} {}",
            award.category.label(),
            award.winner,
            detail
        ));
    }

    if outcome.teams.is_empty() {
        lines.push("  No teams for this race.".to_string());
    } else {
        lines.push("  Teams:".to_string());
        for team in &outcome.teams {
            lines.push(format!("    {:>5}  {}", team.points, team.participant_name));
        }
    }

    match outcome.target {
        RolloverTarget::Written { race_number, .. } => {
            if !outcome.next_rollover.is_zero() {
                lines.push(format!(
                    "  {} points roll over to race #{}",
                    outcome.next_rollover.total(),
                    race_number
                ));
            }
        }
        RolloverTarget::Dropped { race_number } => {
            if !outcome.next_rollover.is_zero() {
                let warning = format!(
                    "  Warning: race #{} does not exist, {} rollover points were not carried",
                    race_number,
                    outcome.next_rollover.total()
                );
                lines.push(if use_colors {
                    warning.red().to_string()
                } else {
                    warning
                });
            }
        }
    }

    lines.join("\n")
}

pub fn format_import_summary(summary: &ImportSummary) -> String {
    format!(
        "Imported roster: {} participant(s) added, {} driver(s) added, {} updated, {} race(s) added, {} updated",
        summary.participants_added,
        summary.drivers_added,
        summary.drivers_updated,
        summary.races_added,
        summary.races_updated
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CarNumber, Rollover, WinningCars};
    use crate::pool::{ResultLine, TeamDriver};
    use crate::scoring::{calculate_awards, ScoringCategory};
    use chrono::{NaiveDate, Utc};
    use std::collections::HashSet;

    fn car(s: &str) -> CarNumber {
        CarNumber::parse(s).unwrap()
    }

    fn standing(rank: u32, name: &str, points: u64, races: u32) -> Standing {
        Standing {
            rank,
            participant_id: rank,
            participant_name: name.to_string(),
            total_points: points,
            races_completed: races,
        }
    }

    fn race(number: u32, name: &str) -> Race {
        Race {
            id: number,
            name: name.to_string(),
            race_number: number,
            date: NaiveDate::from_ymd_opt(2026, 2, 15),
            special: false,
            status: RaceStatus::Upcoming,
            rollover: Rollover::default(),
            extra_drivers: None,
            results: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Daytona 500", 20), "Daytona 500");
        assert_eq!(truncate("Daytona 500", 8), "Dayto...");
        assert_eq!(truncate("Daytona", 2), "Da");
    }

    #[test]
    fn test_format_standings_plain() {
        let out = format_standings(
            &[standing(1, "Casey", 540, 2), standing(2, "Avery", 25, 1)],
            false,
        );
        assert_eq!(out, " 1.    540  Casey  (2 races)\n 2.     25  Avery  (1 race)");
    }

    #[test]
    fn test_format_standings_tsv() {
        let out = format_standings_tsv(&[standing(1, "Casey", 540, 2), standing(2, "Avery", 0, 0)]);
        assert_eq!(out, "1\tCasey\t540\t2\n2\tAvery\t0\t0");
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_standings(&[], false), "No participants yet.");
        assert_eq!(format_race_list(&[], false), "No races scheduled.");
        assert_eq!(format_teams(&[], false), "No teams generated for this race.");
        assert_eq!(format_drivers(&[], false), "No drivers yet.");
        assert_eq!(format_participants(&[]), "No participants yet.");
    }

    #[test]
    fn test_race_list_flags() {
        let mut special = race(2, "Atlanta");
        special.special = true;
        special.rollover.first = 135;
        let out = format_race_list(&[race(1, "Daytona"), special], false);

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("#1   upcoming"));
        assert!(lines[0].contains("2026-02-15"));
        assert!(!lines[0].contains('['));
        assert!(lines[1].ends_with("[x2, +135 rollover]"));
    }

    #[test]
    fn test_race_detail_lists_results() {
        let mut r = race(1, "Daytona 500");
        r.status = RaceStatus::Completed;
        let detail = RaceDetail {
            race: r,
            results: vec![ResultLine {
                category: ScoringCategory::FirstPlace,
                car_number: car("24"),
                driver_name: "William Byron".to_string(),
            }],
        };

        let out = format_race_detail(&detail, false);
        assert!(out.starts_with("#1 Daytona 500"));
        assert!(out.contains("Status: completed"));
        assert!(out.contains("1st Place   #24   William Byron"));
    }

    #[test]
    fn test_format_teams_shows_cars() {
        let teams = vec![TeamDetail {
            team_id: 1,
            participant_id: 1,
            participant_name: "Avery".to_string(),
            drivers: vec![
                TeamDriver {
                    driver_id: 1,
                    name: "Kyle Larson".to_string(),
                    car_number: Some(car("5")),
                },
                TeamDriver {
                    driver_id: 9,
                    name: "Unknown".to_string(),
                    car_number: None,
                },
            ],
            points_earned: 160,
        }];

        assert_eq!(
            format_teams(&teams, false),
            "  160  Avery\n       #5 Kyle Larson, Unknown"
        );
    }

    #[test]
    fn test_submission_warns_on_dropped_rollover() {
        let winners = WinningCars {
            first_place: car("66"),
            second_place: car("1"),
            last_place: car("1"),
            stage1_winner: car("1"),
            stage2_winner: car("1"),
        };
        let chartered: HashSet<CarNumber> = [car("1")].into_iter().collect();
        let awards = calculate_awards(&Rollover::default(), 1, &winners, &chartered).unwrap();
        let outcome = ResultsSubmission {
            race_id: 36,
            race_number: 36,
            next_rollover: awards.next_rollover(),
            awards,
            teams: Vec::new(),
            target: RolloverTarget::Dropped { race_number: 37 },
        };

        let out = format_submission(&outcome, false);
        assert!(out.contains("1st Place   #66   open entry, 135 rolls over"));
        assert!(out.contains("2nd Place   #1    pays 25"));
        assert!(out.contains("race #37 does not exist, 135 rollover points were not carried"));
    }
}
