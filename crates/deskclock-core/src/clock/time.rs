//! Wall-clock access.
//!
//! Alarm matching compares structured hour/minute/second values, never
//! formatted strings.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

/// A local time of day with second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    /// Build a time of day, returning `None` when any component is out of range.
    pub fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        (hour <= 23 && minute <= 59 && second <= 59).then_some(Self {
            hour,
            minute,
            second,
        })
    }

    pub fn from_secs_of_day(secs: u32) -> Self {
        let secs = secs % 86_400;
        Self {
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
        }
    }

    pub fn secs_of_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Source of the current local time.
pub trait WallClock {
    fn now(&self) -> TimeOfDay;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> TimeOfDay {
        let now = Local::now();
        TimeOfDay {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            // Leap seconds report 60.
            second: now.second().min(59) as u8,
        }
    }
}

/// Milliseconds until the next wall-clock second boundary (1..=1000).
pub fn millis_to_next_second() -> u64 {
    let subsec = Local::now().timestamp_subsec_millis().min(999) as u64;
    1000 - subsec
}

/// A settable clock for tests and simulations.
///
/// Clones share the same underlying time, so a test can keep a handle while
/// the engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    secs: Arc<Mutex<u32>>,
}

impl ManualClock {
    pub fn at(hour: u8, minute: u8, second: u8) -> Self {
        let start = TimeOfDay {
            hour,
            minute,
            second,
        };
        Self {
            secs: Arc::new(Mutex::new(start.secs_of_day())),
        }
    }

    pub fn set(&self, time: TimeOfDay) {
        if let Ok(mut secs) = self.secs.lock() {
            *secs = time.secs_of_day();
        }
    }

    /// Move forward, wrapping at midnight.
    pub fn advance_secs(&self, delta: u32) {
        if let Ok(mut secs) = self.secs.lock() {
            *secs = (*secs + delta) % 86_400;
        }
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> TimeOfDay {
        let secs = self.secs.lock().map(|s| *s).unwrap_or(0);
        TimeOfDay::from_secs_of_day(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range() {
        assert!(TimeOfDay::new(23, 59, 59).is_some());
        assert!(TimeOfDay::new(24, 0, 0).is_none());
        assert!(TimeOfDay::new(0, 60, 0).is_none());
    }

    #[test]
    fn manual_clock_wraps_at_midnight() {
        let clock = ManualClock::at(23, 59, 58);
        clock.advance_secs(3);
        assert_eq!(clock.now(), TimeOfDay::new(0, 0, 1).unwrap());
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::at(8, 0, 0);
        let handle = clock.clone();
        handle.advance_secs(90);
        assert_eq!(clock.now().to_string(), "08:01:30");
    }

    #[test]
    fn next_second_is_within_one_second() {
        let ms = millis_to_next_second();
        assert!((1..=1000).contains(&ms));
    }
}
