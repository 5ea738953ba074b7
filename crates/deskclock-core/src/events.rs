use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{AlarmTarget, Countdown, EngineState};
use crate::input::InputForm;
use crate::notify::ExpiryKind;
use crate::present::Frame;

/// Every state change in the engine produces an Event.
/// Front ends render frames and forms; everything else is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A timer or alarm form opened with these pre-filled values.
    InputRequested {
        form: InputForm,
        at: DateTime<Utc>,
    },
    TimerArmed {
        duration: Countdown,
        at: DateTime<Utc>,
    },
    AlarmArmed {
        target: AlarmTarget,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero or an alarm minute arrived.
    Expired {
        kind: ExpiryKind,
        message: String,
        at: DateTime<Utc>,
    },
    /// An input form was abandoned or a running timer/alarm was stopped.
    Cancelled {
        from: EngineState,
        at: DateTime<Utc>,
    },
    QuitRequested {
        at: DateTime<Utc>,
    },
    Frame(Frame),
}
