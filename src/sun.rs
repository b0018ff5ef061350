//! Sun time lookup and the once-per-day cache in front of it.

use anyhow::Result;
use chrono::{DateTime, Datelike, Local, NaiveDate};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::constants::{DEFAULT_SUNRISE, DEFAULT_SUNSET};
use crate::hhmm::HhMm;

/// Today's sun times, minute resolution, local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunInfo {
    pub sunrise: HhMm,
    pub sunset: HhMm,
}

impl SunInfo {
    /// Fallback used until the first successful lookup: 06:00 / 18:00.
    pub fn fallback() -> Self {
        Self {
            sunrise: DEFAULT_SUNRISE,
            sunset: DEFAULT_SUNSET,
        }
    }
}

/// Source of sun times for a calendar date.
#[cfg_attr(test, mockall::automock)]
pub trait SunLookup: Send {
    fn sun_times(&self, date: NaiveDate) -> Result<SunInfo>;
}

/// Lookup used when no coordinates are configured: always succeeds with
/// the fixed 06:00 / 18:00 defaults.
pub struct StaticLookup;

impl SunLookup for StaticLookup {
    fn sun_times(&self, _date: NaiveDate) -> Result<SunInfo> {
        Ok(SunInfo::fallback())
    }
}

/// Astronomical lookup for a fixed location.
pub struct SolarLookup {
    coords: Coordinates,
}

impl SolarLookup {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coords = Coordinates::new(latitude, longitude)
            .ok_or_else(|| anyhow::anyhow!("Invalid coordinates: {latitude}, {longitude}"))?;
        Ok(Self { coords })
    }
}

impl SunLookup for SolarLookup {
    fn sun_times(&self, date: NaiveDate) -> Result<SunInfo> {
        let day = SolarDay::new(self.coords, date);
        let sunrise = day.event_time(SolarEvent::Sunrise).with_timezone(&Local);
        let sunset = day.event_time(SolarEvent::Sunset).with_timezone(&Local);
        Ok(SunInfo {
            sunrise: HhMm::from(sunrise),
            sunset: HhMm::from(sunset),
        })
    }
}

/// Cached sun times, refreshed when the day of year changes.
///
/// A failed refresh keeps the previous values and leaves the staleness
/// marker untouched, so the very next call tries again. Configured minute
/// offsets are folded in on refresh, callers always see effective times.
pub struct SunTimes {
    lookup: Box<dyn SunLookup>,
    sunrise_offset: i32,
    sunset_offset: i32,
    cached: SunInfo,
    /// Day of year the cache was filled for; None before the first refresh.
    cached_day: Option<u32>,
    updated: Option<DateTime<Local>>,
}

impl SunTimes {
    pub fn new(lookup: Box<dyn SunLookup>, sunrise_offset: i32, sunset_offset: i32) -> Self {
        Self {
            lookup,
            sunrise_offset,
            sunset_offset,
            cached: SunInfo::fallback(),
            cached_day: None,
            updated: None,
        }
    }

    /// Current sun times, refreshing first if the cache is stale.
    ///
    /// Returns the times and whether a refresh happened, so the caller can
    /// log new values exactly once per day.
    pub fn times(&mut self, now: DateTime<Local>) -> (SunInfo, bool) {
        let day = now.ordinal();
        if self.cached_day == Some(day) {
            return (self.cached, false);
        }
        match self.lookup.sun_times(now.date_naive()) {
            Ok(info) => {
                self.cached = SunInfo {
                    sunrise: info.sunrise.add_minutes(self.sunrise_offset),
                    sunset: info.sunset.add_minutes(self.sunset_offset),
                };
                self.cached_day = Some(day);
                self.updated = Some(now);
                (self.cached, true)
            }
            Err(e) => {
                log_warning!("Sun time lookup failed, keeping previous times: {e}");
                (self.cached, false)
            }
        }
    }

    /// When the cache was last successfully refreshed.
    pub fn cache_updated(&self) -> Option<DateTime<Local>> {
        self.updated
    }
}
