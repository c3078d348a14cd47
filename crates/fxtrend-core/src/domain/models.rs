use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{RateDate, ValidationError};

/// One quoted rate of a base currency against the quote currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRatePoint")]
pub struct RatePoint {
    pub date: RateDate,
    pub rate: f64,
}

#[derive(Deserialize)]
struct RawRatePoint {
    date: RateDate,
    rate: f64,
}

impl TryFrom<RawRatePoint> for RatePoint {
    type Error = ValidationError;

    fn try_from(value: RawRatePoint) -> Result<Self, Self::Error> {
        Self::new(value.date, value.rate)
    }
}

impl RatePoint {
    pub fn new(date: RateDate, rate: f64) -> Result<Self, ValidationError> {
        validate_rate("rate", rate)?;
        Ok(Self { date, rate })
    }
}

/// Rate points ordered by strictly increasing date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RatePoint>", into = "Vec<RatePoint>")]
pub struct Series(Vec<RatePoint>);

impl Series {
    pub fn new(points: Vec<RatePoint>) -> Result<Self, ValidationError> {
        for window in points.windows(2) {
            ensure_newer(&window[0], &window[1])?;
        }
        Ok(Self(points))
    }

    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a series from points in any order. When a date repeats, the
    /// point seen last wins.
    pub fn from_unordered(points: impl IntoIterator<Item = RatePoint>) -> Self {
        let mut points: Vec<RatePoint> = points.into_iter().collect();
        points.sort_by_key(|point| point.date);

        let mut deduped: Vec<RatePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        Self(deduped)
    }

    /// Appends `point` if it is strictly newer than the current last point.
    /// The series is left untouched on error.
    pub fn push(&mut self, point: RatePoint) -> Result<(), ValidationError> {
        if let Some(last) = self.0.last() {
            ensure_newer(last, &point)?;
        }
        self.0.push(point);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.0
    }

    pub fn first(&self) -> Option<&RatePoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&RatePoint> {
        self.0.last()
    }

    pub fn rates(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|point| point.rate)
    }

    pub fn into_points(self) -> Vec<RatePoint> {
        self.0
    }
}

impl TryFrom<Vec<RatePoint>> for Series {
    type Error = ValidationError;

    fn try_from(value: Vec<RatePoint>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Series> for Vec<RatePoint> {
    fn from(value: Series) -> Self {
        value.0
    }
}

/// Rates of both tracked currencies on a day quoted for each of them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedPoint {
    pub date: RateDate,
    pub rate_a: f64,
    pub rate_b: f64,
}

/// Direction of a series' least-squares slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Stable => "STABLE",
        }
    }

    /// Headline shown on a prediction panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "Going Up",
            Self::Down => "Going Down",
            Self::Stable => "Stable",
        }
    }

    pub const fn tendency(self) -> &'static str {
        match self {
            Self::Up => "positive",
            Self::Down => "negative",
            Self::Stable => "neutral",
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trend and most recent rate for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrencySummary {
    pub trend: Trend,
    pub current_rate: Option<f64>,
}

fn ensure_newer(previous: &RatePoint, next: &RatePoint) -> Result<(), ValidationError> {
    if next.date <= previous.date {
        return Err(ValidationError::UnorderedSeries {
            previous: previous.date.format_iso(),
            next: next.date.format_iso(),
        });
    }
    Ok(())
}

fn validate_rate(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}
