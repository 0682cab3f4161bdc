//! Wall-clock seam for the time of day captured at encounter start.
//!
//! The event source's timestamps are relative to its own clock, so the
//! history additionally records the local time of day at which each
//! encounter began. [`WallClock`] abstracts where that value comes from so
//! tests can pin it.

use chrono::{Local, NaiveTime};

/// A source of the current local time of day.
pub trait WallClock: Send + Sync {
    /// Return the current local time of day.
    fn time_of_day(&self) -> NaiveTime;
}

/// Reads the operating system's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always reports the same time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWallClock(pub NaiveTime);

impl FixedWallClock {
    /// Create a clock pinned to `hour:minute:second`.
    ///
    /// Out-of-range components fall back to midnight.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Self {
        Self(NaiveTime::from_hms_opt(hour, minute, second).unwrap_or(NaiveTime::MIN))
    }
}

impl WallClock for FixedWallClock {
    fn time_of_day(&self) -> NaiveTime {
        self.0
    }
}
