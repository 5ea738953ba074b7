mod countdown;
mod engine;
pub mod time;

pub use countdown::{AlarmTarget, Countdown, Step};
pub use engine::{EngineState, Mode, ModeEngine, DEFAULT_TIMER_MINUTES};
pub use time::{ManualClock, SystemClock, TimeOfDay, WallClock};
