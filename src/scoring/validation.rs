use serde::Deserialize;

use super::category::ScoringCategory;
use crate::model::{CarNumber, WinningCars};

/// Winning car numbers as submitted, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsInput {
    pub first_place: Option<String>,
    pub second_place: Option<String>,
    pub last_place: Option<String>,
    pub stage1_winner: Option<String>,
    pub stage2_winner: Option<String>,
}

impl ResultsInput {
    fn get(&self, category: ScoringCategory) -> Option<&str> {
        let raw = match category {
            ScoringCategory::FirstPlace => &self.first_place,
            ScoringCategory::SecondPlace => &self.second_place,
            ScoringCategory::LastPlace => &self.last_place,
            ScoringCategory::Stage1Winner => &self.stage1_winner,
            ScoringCategory::Stage2Winner => &self.stage2_winner,
        };
        raw.as_deref()
    }
}

/// Validate submitted results.
/// Returns all validation errors at once (not just the first), so no category
/// is ever applied from a half-valid submission.
pub fn validate_results(input: &ResultsInput) -> Result<WinningCars, Vec<String>> {
    let mut errors = Vec::new();
    let mut parsed: [Option<CarNumber>; 5] = Default::default();

    for category in ScoringCategory::ALL {
        match input.get(category) {
            None => errors.push(format!("results.{}: missing car number", category.key())),
            Some(raw) => match CarNumber::parse(raw) {
                Ok(car) => parsed[category.index()] = Some(car),
                Err(e) => errors.push(format!(
                    "results.{}: invalid car number '{}' - {}",
                    category.key(),
                    raw,
                    e
                )),
            },
        }
    }

    match parsed {
        [Some(first_place), Some(second_place), Some(last_place), Some(stage1_winner), Some(stage2_winner)]
            if errors.is_empty() =>
        {
            Ok(WinningCars {
                first_place,
                second_place,
                last_place,
                stage1_winner,
                stage2_winner,
            })
        }
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input() -> ResultsInput {
        ResultsInput {
            first_place: Some("5".to_string()),
            second_place: Some("11".to_string()),
            last_place: Some("51".to_string()),
            stage1_winner: Some("5".to_string()),
            stage2_winner: Some("00".to_string()),
        }
    }

    #[test]
    fn test_valid_results() {
        let winners = validate_results(&full_input()).unwrap();
        assert_eq!(winners.first_place.as_str(), "5");
        assert_eq!(winners.stage1_winner.as_str(), "5");
        assert_eq!(winners.stage2_winner.as_str(), "00");
    }

    #[test]
    fn test_missing_category() {
        let input = ResultsInput {
            last_place: None,
            ..full_input()
        };
        let errors = validate_results(&input).unwrap_err();
        assert_eq!(errors, vec!["results.last_place: missing car number".to_string()]);
    }

    #[test]
    fn test_malformed_car_number() {
        let input = ResultsInput {
            stage1_winner: Some("twelve".to_string()),
            ..full_input()
        };
        let errors = validate_results(&input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("results.stage1_winner: invalid car number 'twelve'"));
    }

    #[test]
    fn test_collects_all_errors() {
        let input = ResultsInput {
            first_place: None,
            second_place: Some("".to_string()),
            ..full_input()
        };
        let errors = validate_results(&input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("first_place"));
        assert!(errors[1].contains("second_place"));
    }

    #[test]
    fn test_empty_input() {
        let errors = validate_results(&ResultsInput::default()).unwrap_err();
        assert_eq!(errors.len(), 5);
    }
}
