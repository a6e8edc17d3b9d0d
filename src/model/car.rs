use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_DIGITS: usize = 3;

/// Permanent car number, the key every scoring join uses.
///
/// Stored as text so that "0" and "00" stay distinct cars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct CarNumber(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CarNumberError {
    #[error("car number is empty")]
    Empty,
    #[error("'{0}' is not a car number (digits only)")]
    NotDigits(String),
    #[error("'{0}' has more than three digits")]
    TooLong(String),
}

impl CarNumber {
    pub fn parse(input: &str) -> Result<Self, CarNumberError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CarNumberError::Empty);
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(CarNumberError::NotDigits(trimmed.to_string()));
        }
        if trimmed.len() > MAX_DIGITS {
            return Err(CarNumberError::TooLong(trimmed.to_string()));
        }
        Ok(CarNumber(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric_value(&self) -> u32 {
        // At most three ASCII digits, cannot overflow.
        self.0
            .bytes()
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    }
}

impl fmt::Display for CarNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for CarNumber {
    type Err = CarNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CarNumber::parse(s)
    }
}

impl From<CarNumber> for String {
    fn from(car: CarNumber) -> Self {
        car.0
    }
}

/// Orders by numeric value first, so "9" sorts before "12" and "00" sits next to "0".
impl Ord for CarNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric_value()
            .cmp(&other.numeric_value())
            .then_with(|| self.0.len().cmp(&other.0.len()))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for CarNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// YAML rosters often write car numbers unquoted, so accept integers too.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCarNumber {
    Text(String),
    Number(u64),
}

impl<'de> Deserialize<'de> for CarNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawCarNumber::deserialize(deserializer)? {
            RawCarNumber::Text(s) => s,
            RawCarNumber::Number(n) => n.to_string(),
        };
        CarNumber::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(CarNumber::parse("9").unwrap().as_str(), "9");
        assert_eq!(CarNumber::parse(" 24 ").unwrap().as_str(), "24");
        assert_eq!(CarNumber::parse("00").unwrap().as_str(), "00");
    }

    #[test]
    fn test_zero_and_double_zero_are_distinct() {
        assert_ne!(CarNumber::parse("0").unwrap(), CarNumber::parse("00").unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(CarNumber::parse(""), Err(CarNumberError::Empty));
        assert_eq!(CarNumber::parse("   "), Err(CarNumberError::Empty));
        assert_eq!(
            CarNumber::parse("4a"),
            Err(CarNumberError::NotDigits("4a".to_string()))
        );
        assert_eq!(
            CarNumber::parse("-5"),
            Err(CarNumberError::NotDigits("-5".to_string()))
        );
        assert_eq!(
            CarNumber::parse("1234"),
            Err(CarNumberError::TooLong("1234".to_string()))
        );
    }

    #[test]
    fn test_ordering_is_numeric() {
        let mut cars: Vec<CarNumber> = ["12", "9", "00", "0", "3"]
            .iter()
            .map(|s| CarNumber::parse(s).unwrap())
            .collect();
        cars.sort();
        let order: Vec<&str> = cars.iter().map(|c| c.as_str()).collect();
        assert_eq!(order, vec!["0", "00", "3", "9", "12"]);
    }

    #[test]
    fn test_deserialize_from_string_and_integer() {
        let quoted: CarNumber = serde_json::from_str("\"00\"").unwrap();
        assert_eq!(quoted.as_str(), "00");

        let bare: CarNumber = serde_json::from_str("48").unwrap();
        assert_eq!(bare.as_str(), "48");

        assert!(serde_json::from_str::<CarNumber>("\"x1\"").is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let car = CarNumber::parse("07").unwrap();
        assert_eq!(serde_json::to_string(&car).unwrap(), "\"07\"");
    }
}
