use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

use crate::ValidationError;

const ISO_DAY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar day (UTC) a rate is quoted for, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RateDate(Date);

impl RateDate {
    pub fn today_utc() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), ISO_DAY)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    /// Truncates a unix timestamp (seconds) to its UTC calendar day.
    pub fn from_unix_timestamp(seconds: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(|value| Self(value.date()))
            .map_err(|_| ValidationError::InvalidTimestamp { value: seconds })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    /// Returns the day `days` before this one, saturating at the earliest
    /// representable date.
    pub fn days_before(self, days: u32) -> Self {
        self.0
            .checked_sub(Duration::days(i64::from(days)))
            .map(Self)
            .unwrap_or(Self(Date::MIN))
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(ISO_DAY)
            .unwrap_or_else(|_| self.0.to_string())
    }
}

impl Display for RateDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl From<Date> for RateDate {
    fn from(value: Date) -> Self {
        Self(value)
    }
}

impl Serialize for RateDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for RateDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
