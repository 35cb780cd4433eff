//! Relative expiration times such as `"+10 minutes"`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StashError;

/// Default lifetime of a stashed request.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(10 * 60);

/// How long a stashed request stays retrievable, counted from when it is stored.
///
/// Parses from strings like `"+10 minutes"`, `"+ 10 minutes"`, `"30 seconds"`,
/// `"2h"`, `"1 day"`, or a bare number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiration(Duration);

impl Expiration {
    /// Expire after the given duration.
    pub const fn after(duration: Duration) -> Self {
        Self(duration)
    }

    /// Expire after `minutes` minutes.
    pub const fn minutes(minutes: u64) -> Self {
        Self(Duration::from_secs(minutes * 60))
    }

    /// The lifetime as a duration.
    pub const fn duration(&self) -> Duration {
        self.0
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Self(DEFAULT_EXPIRATION)
    }
}

impl From<Duration> for Expiration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

fn unit_seconds(unit: &str) -> Option<u64> {
    let seconds = match unit {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hour" | "hours" => 60 * 60,
        "d" | "day" | "days" => 24 * 60 * 60,
        "w" | "week" | "weeks" => 7 * 24 * 60 * 60,
        _ => return None,
    };
    Some(seconds)
}

impl FromStr for Expiration {
    type Err = StashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StashError::InvalidExpiration(s.to_string());

        let rest = s.trim();
        let rest = rest.strip_prefix('+').unwrap_or(rest).trim_start();

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(invalid());
        }

        let amount: u64 = rest[..digits_end].parse().map_err(|_| invalid())?;
        let unit = rest[digits_end..].trim().to_ascii_lowercase();
        let multiplier = unit_seconds(&unit).ok_or_else(invalid)?;
        let seconds = amount.checked_mul(multiplier).ok_or_else(invalid)?;

        Ok(Self(Duration::from_secs(seconds)))
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        let (amount, unit) = if secs != 0 && secs % 86_400 == 0 {
            (secs / 86_400, "days")
        } else if secs != 0 && secs % 3_600 == 0 {
            (secs / 3_600, "hours")
        } else if secs != 0 && secs % 60 == 0 {
            (secs / 60, "minutes")
        } else {
            (secs, "seconds")
        };
        write!(f, "+{} {}", amount, unit)
    }
}

impl Serialize for Expiration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Expiration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Duration {
        s.parse::<Expiration>().unwrap().duration()
    }

    #[test]
    fn test_default_is_ten_minutes() {
        assert_eq!(Expiration::default().duration(), Duration::from_secs(600));
    }

    #[test]
    fn test_parse_relative_forms() {
        assert_eq!(parse("+10 minutes"), Duration::from_secs(600));
        assert_eq!(parse("+ 10 minutes"), Duration::from_secs(600));
        assert_eq!(parse("30 seconds"), Duration::from_secs(30));
        assert_eq!(parse("2h"), Duration::from_secs(7200));
        assert_eq!(parse("1 Day"), Duration::from_secs(86_400));
        assert_eq!(parse("1 week"), Duration::from_secs(604_800));
        assert_eq!(parse("45"), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "+", "-5 minutes", "ten minutes", "5 fortnights", "5.5 hours"] {
            assert!(
                matches!(bad.parse::<Expiration>(), Err(StashError::InvalidExpiration(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_display_picks_largest_unit() {
        assert_eq!(Expiration::minutes(10).to_string(), "+10 minutes");
        assert_eq!(Expiration::after(Duration::from_secs(7200)).to_string(), "+2 hours");
        assert_eq!(Expiration::after(Duration::from_secs(90)).to_string(), "+90 seconds");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Expiration::minutes(5)).unwrap();
        assert_eq!(json, "\"+5 minutes\"");

        let back: Expiration = serde_json::from_str("\"+ 1 hour\"").unwrap();
        assert_eq!(back.duration(), Duration::from_secs(3600));
    }
}
