//! # deskclock Core Library
//!
//! Logic behind an always-on-top desktop clock that can also run a single
//! countdown timer or a time-of-day alarm. Window handling, rendering and
//! the concrete alert mechanism live in front ends; this crate only decides
//! what to show and when to notify.
//!
//! ## Architecture
//!
//! - **Mode Engine**: a state machine over Clock / Timer / Alarm that the
//!   caller drives with commands and once-per-second `tick()` calls
//! - **Ticker**: a re-armable periodic source of tick signals
//! - **Notifier**: fire-and-forget delivery of expiry messages
//! - **Runtime**: the single event loop that serializes commands and ticks
//!
//! ## Key Components
//!
//! - [`ModeEngine`]: Core state machine
//! - [`Config`]: Application configuration management
//! - [`Notifier`]: Trait for notification delivery
//! - [`Presenter`]: Trait for front ends that render frames

pub mod clock;
pub mod error;
pub mod events;
pub mod input;
pub mod notify;
pub mod present;
pub mod runtime;
pub mod storage;
pub mod ticker;

pub use clock::{
    AlarmTarget, Countdown, EngineState, ManualClock, Mode, ModeEngine, SystemClock, TimeOfDay,
    WallClock,
};
pub use error::{ConfigError, CoreError, InputError};
pub use events::Event;
pub use input::{Command, Field, FormKind, InputForm};
pub use notify::{ExpiryKind, Notification, Notifier, SoundCue};
pub use present::{Frame, Presenter};
pub use storage::Config;
pub use ticker::{ManualTicker, TickSignal, Ticker, TokioTicker};
