//! Countdown and alarm-target arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::time::TimeOfDay;

/// Minutes and seconds left on a countdown.
///
/// `seconds` always stays within 0..=59 and nothing ever goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    minutes: u32,
    seconds: u8,
}

/// Result of advancing a countdown by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Still time left after the decrement.
    Running,
    /// The decrement reached 00:00.
    Finished,
    /// Was already at 00:00 before the tick.
    Exhausted,
}

impl Countdown {
    /// Build from raw minutes/seconds, carrying whole minutes out of `seconds`.
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self {
            minutes: minutes + seconds / 60,
            seconds: (seconds % 60) as u8,
        }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn total_secs(&self) -> u64 {
        self.minutes as u64 * 60 + self.seconds as u64
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0
    }

    /// The value stored when arming: one second longer than requested, so the
    /// first decrement lands on the requested value.
    pub fn padded(&self) -> Self {
        Self::new(self.minutes, self.seconds as u32 + 1)
    }

    /// Decrement by one second.
    pub fn step(&mut self) -> Step {
        if self.seconds > 0 {
            self.seconds -= 1;
        } else if self.minutes > 0 {
            self.seconds = 59;
            self.minutes -= 1;
        } else {
            return Step::Exhausted;
        }
        if self.is_zero() {
            Step::Finished
        } else {
            Step::Running
        }
    }

    /// Display form used while counting down, e.g. `00:09:59`.
    pub fn display(&self) -> String {
        format!("00:{:02}:{:02}", self.minutes, self.seconds)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Hour and minute an alarm fires at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmTarget {
    hour: u8,
    minute: u8,
}

impl AlarmTarget {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour <= 23 && minute <= 59).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// True only at second zero of the target minute.
    pub fn matches(&self, now: TimeOfDay) -> bool {
        now.hour == self.hour && now.minute == self.minute && now.second == 0
    }
}

impl fmt::Display for AlarmTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
