use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical identifiers for the upstream rate services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Frankfurter,
    OpenErApi,
    Fixture,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Frankfurter, Self::OpenErApi, Self::Fixture];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frankfurter => "frankfurter",
            Self::OpenErApi => "openerapi",
            Self::Fixture => "fixture",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "frankfurter" => Ok(Self::Frankfurter),
            "openerapi" | "open-er-api" => Ok(Self::OpenErApi),
            "fixture" => Ok(Self::Fixture),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}
