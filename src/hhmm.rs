//! Minute-granularity time-of-day values.
//!
//! The rule table and the rotation schedule both work in wall-clock minutes:
//! a trigger matches when the current "HH:MM" equals the configured one, and
//! a rotation is due when the current "HH:MM" reaches the scheduled one.
//! `HhMm` makes that comparison an explicit, totally ordered value type
//! instead of ad-hoc string formatting. Seconds are deliberately ignored.
//!
//! Note the rotation comparison is time-of-day only: a scheduled time whose
//! date is tomorrow but whose HH:MM has already passed today compares as
//! due. See `rotation::RotationScheduler::should_rotate`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveTime, Timelike};
use serde::Deserialize;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day at minute granularity, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct HhMm(u16);

impl HhMm {
    /// Construct from an hour and minute. Values wrap into range.
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self((hour as u16 % 24) * 60 + minute as u16 % 60)
    }

    /// Construct from minutes since midnight, wrapping across days.
    pub const fn from_minutes(minutes: u16) -> Self {
        Self(minutes % MINUTES_PER_DAY)
    }

    pub const fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub const fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Add a signed minute offset, wrapping across midnight.
    ///
    /// Used for sun-relative triggers such as "sunrise - 30 minutes".
    pub fn add_minutes(self, offset: i32) -> Self {
        let day = i32::from(MINUTES_PER_DAY);
        let shifted = (i32::from(self.0) + offset).rem_euclid(day);
        Self(shifted as u16)
    }
}

impl fmt::Display for HhMm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl From<NaiveTime> for HhMm {
    fn from(time: NaiveTime) -> Self {
        Self::new(time.hour() as u8, time.minute() as u8)
    }
}

impl From<DateTime<Local>> for HhMm {
    fn from(dt: DateTime<Local>) -> Self {
        Self::new(dt.hour() as u8, dt.minute() as u8)
    }
}

impl FromStr for HhMm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("Invalid time of day '{s}', expected HH:MM"))?;
        let hour: u8 = h
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid hour in '{s}'"))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid minute in '{s}'"))?;
        if hour > 23 || minute > 59 {
            anyhow::bail!("Time of day '{s}' out of range");
        }
        Ok(Self::new(hour, minute))
    }
}

impl TryFrom<String> for HhMm {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let t: HhMm = "19:32".parse().unwrap();
        assert_eq!(t, HhMm::new(19, 32));
        assert_eq!(t.to_string(), "19:32");
        assert_eq!(HhMm::new(6, 5).to_string(), "06:05");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("1932".parse::<HhMm>().is_err());
        assert!("24:00".parse::<HhMm>().is_err());
        assert!("12:60".parse::<HhMm>().is_err());
        assert!("ab:cd".parse::<HhMm>().is_err());
    }

    #[test]
    fn total_ordering_matches_wall_clock() {
        assert!(HhMm::new(9, 0) < HhMm::new(19, 0));
        assert!(HhMm::new(19, 0) < HhMm::new(19, 1));
        assert!(HhMm::new(0, 0) < HhMm::new(23, 59));
    }

    #[test]
    fn offset_wraps_across_midnight() {
        assert_eq!(HhMm::new(0, 15).add_minutes(-30), HhMm::new(23, 45));
        assert_eq!(HhMm::new(23, 45).add_minutes(30), HhMm::new(0, 15));
        assert_eq!(HhMm::new(6, 0).add_minutes(-30), HhMm::new(5, 30));
    }

    #[test]
    fn ignores_seconds_from_chrono_times() {
        let time = NaiveTime::from_hms_opt(19, 32, 59).unwrap();
        assert_eq!(HhMm::from(time), HhMm::new(19, 32));
    }
}
