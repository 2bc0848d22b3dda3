//! Forecast output slots: a model run reference time plus a lead time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};
use crate::step::ModelStep;

/// Format used for reference times in identifiers and output paths.
pub const REFTIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One forecast output slot.
///
/// Ordered by reference time, then step. Two instants naming the same
/// physical time through different runs are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instant {
    /// Model run/reference time
    pub reftime: DateTime<Utc>,
    /// Lead time from the reference time
    pub step: ModelStep,
}

impl Instant {
    pub fn new(reftime: DateTime<Utc>, step: impl Into<ModelStep>) -> Self {
        Self {
            reftime,
            step: step.into(),
        }
    }

    /// Reference time formatted for output paths.
    pub fn reftime_str(&self) -> String {
        self.reftime.format(REFTIME_FORMAT).to_string()
    }

    /// Reference time plus lead time.
    pub fn valid_datetime(&self) -> DateTime<Utc> {
        self.reftime + Duration::hours(i64::from(self.step.hours()))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.reftime.format(REFTIME_FORMAT), self.step)
    }
}

impl FromStr for Instant {
    type Err = CommonError;

    /// Parse the `Display` form, e.g. `2024-01-15T00:00:00+12h`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (reftime, step) = s
            .rsplit_once('+')
            .ok_or_else(|| CommonError::InvalidInstant(s.to_string()))?;
        Ok(Self {
            reftime: parse_reftime(reftime)?,
            step: step.parse()?,
        })
    }
}

/// Parse a reference time in RFC 3339 or bare `YYYY-MM-DDTHH:MM:SS` (UTC) form.
pub fn parse_reftime(s: &str) -> CommonResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, REFTIME_FORMAT)
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .map_err(|_| CommonError::InvalidInstant(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reftime(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_display_and_parse() {
        let instant = Instant::new(reftime(0), 12u32);
        assert_eq!(instant.to_string(), "2024-01-15T00:00:00+12h");
        assert_eq!(instant.to_string().parse::<Instant>().unwrap(), instant);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("2024-01-15T00:00:00".parse::<Instant>().is_err());
        assert!("yesterday+12h".parse::<Instant>().is_err());
        assert!("2024-01-15T00:00:00+12".parse::<Instant>().is_err());
    }

    #[test]
    fn test_ordering_reftime_first() {
        let early_long = Instant::new(reftime(0), 24u32);
        let late_short = Instant::new(reftime(12), 0u32);
        assert!(early_long < late_short);
        assert!(Instant::new(reftime(0), 6u32) < Instant::new(reftime(0), 12u32));
    }

    #[test]
    fn test_same_physical_time_is_distinct() {
        let a = Instant::new(reftime(0), 12u32);
        let b = Instant::new(reftime(12), 0u32);
        assert_eq!(a.valid_datetime(), b.valid_datetime());
        assert_ne!(a, b);
    }
}
