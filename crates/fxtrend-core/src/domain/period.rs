use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Selectable look-back windows, in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Period {
    OneWeek,
    TwoWeeks,
    ThreeWeeks,
    FourWeeks,
    ThirtyDays,
    #[default]
    SixtyDays,
    NinetyDays,
    HalfYear,
    OneYear,
}

impl Period {
    pub const ALL: [Self; 9] = [
        Self::OneWeek,
        Self::TwoWeeks,
        Self::ThreeWeeks,
        Self::FourWeeks,
        Self::ThirtyDays,
        Self::SixtyDays,
        Self::NinetyDays,
        Self::HalfYear,
        Self::OneYear,
    ];

    pub const fn days(self) -> u32 {
        match self {
            Self::OneWeek => 7,
            Self::TwoWeeks => 14,
            Self::ThreeWeeks => 21,
            Self::FourWeeks => 28,
            Self::ThirtyDays => 30,
            Self::SixtyDays => 60,
            Self::NinetyDays => 90,
            Self::HalfYear => 180,
            Self::OneYear => 365,
        }
    }

    pub fn from_days(days: u32) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|period| period.days() == days)
            .ok_or_else(|| ValidationError::InvalidPeriod {
                value: days.to_string(),
            })
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Last {} Days", self.days())
    }
}

impl TryFrom<u32> for Period {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_days(value)
    }
}

impl From<Period> for u32 {
    fn from(value: Period) -> Self {
        value.days()
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        trimmed
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidPeriod {
                value: trimmed.to_owned(),
            })
            .and_then(Self::from_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_the_selectable_windows_in_order() {
        let days = Period::ALL.map(Period::days);
        assert_eq!(days, [7, 14, 21, 28, 30, 60, 90, 180, 365]);
        assert_eq!(Period::default().days(), 60);
    }

    #[test]
    fn parses_known_windows_only() {
        assert_eq!(Period::from_str("90").expect("must parse"), Period::NinetyDays);
        assert!(matches!(
            Period::from_str("45"),
            Err(ValidationError::InvalidPeriod { .. })
        ));
        assert!(matches!(
            Period::from_str("week"),
            Err(ValidationError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn serializes_as_day_count() {
        let json = serde_json::to_string(&Period::HalfYear).expect("serialize");
        assert_eq!(json, "180");
        let back: Period = serde_json::from_str("14").expect("deserialize");
        assert_eq!(back, Period::TwoWeeks);
        assert!(serde_json::from_str::<Period>("15").is_err());
    }
}
