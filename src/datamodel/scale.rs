use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Bucket granularity of a time series, as understood by the usage API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    #[serde(rename = "1S")]
    Second,
    #[serde(rename = "1MIN")]
    Minute,
    #[serde(rename = "1H")]
    Hour,
    #[serde(rename = "1D")]
    Day,
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1MON")]
    Month,
    #[serde(rename = "1Y")]
    Year,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("Unknown scale: {0}")]
    Unknown(String),

    /// Months and years have no fixed length.
    #[error("Unknown duration for scale {0}")]
    UnknownDuration(Scale),

    /// The maximum span of a single history request is only known for some scales.
    #[error("Unknown page size for scale {0}")]
    UnknownPageSize(Scale),
}

impl Scale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Second => "1S",
            Scale::Minute => "1MIN",
            Scale::Hour => "1H",
            Scale::Day => "1D",
            Scale::Week => "1W",
            Scale::Month => "1MON",
            Scale::Year => "1Y",
        }
    }

    /// Interval covered by one bucket of this scale.
    pub fn duration(&self) -> Result<TimeDelta, ScaleError> {
        match self {
            Scale::Second => Ok(TimeDelta::seconds(1)),
            Scale::Minute => Ok(TimeDelta::minutes(1)),
            Scale::Hour => Ok(TimeDelta::hours(1)),
            Scale::Day => Ok(TimeDelta::days(1)),
            Scale::Week => Ok(TimeDelta::weeks(1)),
            Scale::Month | Scale::Year => Err(ScaleError::UnknownDuration(*self)),
        }
    }

    /// Maximum interval a single chart usage request may span.
    pub fn page_size(&self) -> Result<TimeDelta, ScaleError> {
        match self {
            Scale::Second => Ok(TimeDelta::seconds(4000)),
            Scale::Minute => Ok(TimeDelta::minutes(800)),
            Scale::Hour => Ok(TimeDelta::hours(800)),
            _ => Err(ScaleError::UnknownPageSize(*self)),
        }
    }

    /// Checks that history can be fetched and timestamped at this scale.
    pub fn validate_for_history(&self) -> Result<(), ScaleError> {
        self.duration()?;
        self.page_size()?;
        Ok(())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Scale {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1S" => Ok(Scale::Second),
            "1MIN" => Ok(Scale::Minute),
            "1H" => Ok(Scale::Hour),
            "1D" => Ok(Scale::Day),
            "1W" => Ok(Scale::Week),
            "1MON" => Ok(Scale::Month),
            "1Y" => Ok(Scale::Year),
            _ => Err(ScaleError::Unknown(s.to_string())),
        }
    }
}
