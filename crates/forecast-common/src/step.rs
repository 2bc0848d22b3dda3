//! Forecast lead times ("steps").
//!
//! Steps are kept in whole hours. Values coming from GRIB headers carry a
//! time-range unit code and are converted exactly, or rejected.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Errors raised while building or comparing steps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("Malformed step string: {0:?} (expected e.g. \"12h\")")]
    Malformed(String),

    #[error("Unsupported time unit: {0}")]
    UnsupportedUnit(TimeUnit),

    #[error("Invalid time unit code: {0}")]
    InvalidUnit(u8),

    #[error("{value} {unit} is not a whole number of hours")]
    NotHourDivisible { value: u32, unit: TimeUnit },

    #[error("{value} {unit} does not fit in a step")]
    Overflow { value: u32, unit: TimeUnit },

    #[error("Cannot compare a step in '{expected}' with {found:?}")]
    UnitMismatch { expected: String, found: String },
}

impl StepError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StepError::UnitMismatch { .. } => ErrorKind::Value,
            _ => ErrorKind::Configuration,
        }
    }
}

/// Time units found in GRIB time-range fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Month,
    Year,
    Decade,
    /// 30 years
    Normal,
    Century,
    Hours3,
    Hours6,
    Hours12,
    Second,
}

impl TimeUnit {
    /// Decode a GRIB1 unit code (code table 4).
    pub fn from_grib1(code: u8) -> Result<Self, StepError> {
        match code {
            254 => Ok(TimeUnit::Second),
            _ => Self::from_common_code(code),
        }
    }

    /// Decode a GRIB2 unit code (code table 4.4).
    pub fn from_grib2(code: u8) -> Result<Self, StepError> {
        match code {
            13 => Ok(TimeUnit::Second),
            _ => Self::from_common_code(code),
        }
    }

    fn from_common_code(code: u8) -> Result<Self, StepError> {
        match code {
            0 => Ok(TimeUnit::Minute),
            1 => Ok(TimeUnit::Hour),
            2 => Ok(TimeUnit::Day),
            3 => Ok(TimeUnit::Month),
            4 => Ok(TimeUnit::Year),
            5 => Ok(TimeUnit::Decade),
            6 => Ok(TimeUnit::Normal),
            7 => Ok(TimeUnit::Century),
            10 => Ok(TimeUnit::Hours3),
            11 => Ok(TimeUnit::Hours6),
            12 => Ok(TimeUnit::Hours12),
            other => Err(StepError::InvalidUnit(other)),
        }
    }

    /// Convert `value` of this unit to whole hours.
    pub fn to_hours(self, value: u32) -> Result<u32, StepError> {
        let overflow = || StepError::Overflow { value, unit: self };
        match self {
            TimeUnit::Minute => exact_div(value, 60, self),
            TimeUnit::Second => exact_div(value, 3600, self),
            TimeUnit::Hour => Ok(value),
            TimeUnit::Day => value.checked_mul(24).ok_or_else(overflow),
            TimeUnit::Hours3 => value.checked_mul(3).ok_or_else(overflow),
            TimeUnit::Hours6 => value.checked_mul(6).ok_or_else(overflow),
            TimeUnit::Hours12 => value.checked_mul(12).ok_or_else(overflow),
            TimeUnit::Month
            | TimeUnit::Year
            | TimeUnit::Decade
            | TimeUnit::Normal
            | TimeUnit::Century => Err(StepError::UnsupportedUnit(self)),
        }
    }
}

fn exact_div(value: u32, divisor: u32, unit: TimeUnit) -> Result<u32, StepError> {
    if value % divisor == 0 {
        Ok(value / divisor)
    } else {
        Err(StepError::NotHourDivisible { value, unit })
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Minute => "minutes",
            TimeUnit::Hour => "hours",
            TimeUnit::Day => "days",
            TimeUnit::Month => "months",
            TimeUnit::Year => "years",
            TimeUnit::Decade => "decades",
            TimeUnit::Normal => "normals",
            TimeUnit::Century => "centuries",
            TimeUnit::Hours3 => "3-hour periods",
            TimeUnit::Hours6 => "6-hour periods",
            TimeUnit::Hours12 => "12-hour periods",
            TimeUnit::Second => "seconds",
        };
        f.write_str(name)
    }
}

/// Forecast lead time in whole hours.
///
/// ```
/// use forecast_common::ModelStep;
///
/// let step: ModelStep = "12h".parse().unwrap();
/// assert_eq!(step, 12);
/// assert_eq!(step.to_string(), "12h");
/// assert_eq!(step.file_suffix(), "+012");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "StepRepr", into = "String")]
pub struct ModelStep(u32);

impl ModelStep {
    const SUFFIX: &'static str = "h";

    pub const fn new(hours: u32) -> Self {
        Self(hours)
    }

    pub fn hours(&self) -> u32 {
        self.0
    }

    /// Build a step from a GRIB1 `(value, unit code)` pair.
    pub fn from_grib1(value: u32, unit: u8) -> Result<Self, StepError> {
        Ok(Self(TimeUnit::from_grib1(unit)?.to_hours(value)?))
    }

    /// Build a step from a GRIB2 `(value, unit code)` pair.
    pub fn from_grib2(value: u32, unit: u8) -> Result<Self, StepError> {
        Ok(Self(TimeUnit::from_grib2(unit)?.to_hours(value)?))
    }

    /// Zero-padded suffix used in output file names, e.g. `+012`.
    pub fn file_suffix(&self) -> String {
        format!("+{:03}", self.0)
    }

    /// Compare with a suffixed string such as `"12h"`.
    ///
    /// A string in any other unit is a value error, never a silent mismatch.
    pub fn compare_str(&self, other: &str) -> Result<Ordering, StepError> {
        let (value, unit) = split_unit(other)?;
        if unit != Self::SUFFIX {
            return Err(StepError::UnitMismatch {
                expected: Self::SUFFIX.to_string(),
                found: other.to_string(),
            });
        }
        Ok(self.0.cmp(&value))
    }
}

/// Split `"12h"` into `(12, "h")`.
fn split_unit(s: &str) -> Result<(u32, &str), StepError> {
    let trimmed = s.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(digits_end);
    if digits.is_empty() || unit.is_empty() || !unit.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(StepError::Malformed(s.to_string()));
    }
    let value = digits
        .parse()
        .map_err(|_| StepError::Malformed(s.to_string()))?;
    Ok((value, unit))
}

impl FromStr for ModelStep {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_unit(s)? {
            (value, Self::SUFFIX) => Ok(Self(value)),
            _ => Err(StepError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for ModelStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, Self::SUFFIX)
    }
}

impl From<u32> for ModelStep {
    fn from(hours: u32) -> Self {
        Self(hours)
    }
}

impl From<ModelStep> for String {
    fn from(step: ModelStep) -> Self {
        step.to_string()
    }
}

impl PartialEq<u32> for ModelStep {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<u32> for ModelStep {
    fn partial_cmp(&self, other: &u32) -> Option<Ordering> {
        Some(self.0.cmp(other))
    }
}

/// Accepted serialized forms: `12` or `"12h"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum StepRepr {
    Hours(u32),
    Text(String),
}

impl TryFrom<StepRepr> for ModelStep {
    type Error = StepError;

    fn try_from(repr: StepRepr) -> Result<Self, Self::Error> {
        match repr {
            StepRepr::Hours(hours) => Ok(Self(hours)),
            StepRepr::Text(text) => text.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(ModelStep::new(0) < ModelStep::new(12));
        assert!(ModelStep::new(12) < ModelStep::new(13));
        assert!(ModelStep::new(12) > 6);
        assert_eq!(ModelStep::new(12), 12);
    }

    #[test]
    fn test_parse() {
        assert_eq!("12h".parse::<ModelStep>().unwrap(), ModelStep::new(12));
        assert_eq!(" 0h ".parse::<ModelStep>().unwrap(), ModelStep::new(0));
        assert!(matches!(
            "12".parse::<ModelStep>(),
            Err(StepError::Malformed(_))
        ));
        assert!(matches!(
            "h".parse::<ModelStep>(),
            Err(StepError::Malformed(_))
        ));
        assert!(matches!(
            "30m".parse::<ModelStep>(),
            Err(StepError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_grib1() {
        assert_eq!(ModelStep::from_grib1(60, 0).unwrap(), ModelStep::new(1));
        assert_eq!(ModelStep::from_grib1(2, 2).unwrap(), ModelStep::new(48));
        assert_eq!(ModelStep::from_grib1(3, 10).unwrap(), ModelStep::new(9));
        assert_eq!(ModelStep::from_grib1(2, 11).unwrap(), ModelStep::new(12));
        assert_eq!(ModelStep::from_grib1(2, 12).unwrap(), ModelStep::new(24));
        assert_eq!(ModelStep::from_grib1(7200, 254).unwrap(), ModelStep::new(2));
        assert!(matches!(
            ModelStep::from_grib1(30, 0),
            Err(StepError::NotHourDivisible { .. })
        ));
        assert!(matches!(
            ModelStep::from_grib1(1, 3),
            Err(StepError::UnsupportedUnit(TimeUnit::Month))
        ));
        assert!(matches!(
            ModelStep::from_grib1(1, 13),
            Err(StepError::InvalidUnit(13))
        ));
    }

    #[test]
    fn test_from_grib2_seconds_code() {
        assert_eq!(ModelStep::from_grib2(3600, 13).unwrap(), ModelStep::new(1));
        assert!(matches!(
            ModelStep::from_grib2(1, 254),
            Err(StepError::InvalidUnit(254))
        ));
    }

    #[test]
    fn test_compare_str() {
        let step = ModelStep::new(12);
        assert_eq!(step.compare_str("12h").unwrap(), Ordering::Equal);
        assert_eq!(step.compare_str("6h").unwrap(), Ordering::Greater);
        let err = step.compare_str("720m").unwrap_err();
        assert!(matches!(err, StepError::UnitMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(ModelStep::new(3).to_string(), "3h");
        assert_eq!(ModelStep::new(3).file_suffix(), "+003");
        assert_eq!(ModelStep::new(120).file_suffix(), "+120");
    }

    #[test]
    fn test_serde_forms() {
        let from_int: ModelStep = serde_json::from_str("6").unwrap();
        let from_text: ModelStep = serde_json::from_str("\"6h\"").unwrap();
        assert_eq!(from_int, from_text);
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "\"6h\"");
        assert!(serde_json::from_str::<ModelStep>("\"6x\"").is_err());
    }
}
