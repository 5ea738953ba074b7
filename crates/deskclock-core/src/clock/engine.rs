//! Mode engine.
//!
//! Owns the clock state and drives every transition. It holds no rendering
//! handle: callers feed it commands and periodic ticks, and it answers with
//! [`Event`]s and [`Frame`]s.
//!
//! ## State Transitions
//!
//! ```text
//! Clock -> AwaitingTimerInput -> TimerRunning -> Clock
//! Clock -> AwaitingAlarmInput -> AlarmArmed   -> Clock
//! Awaiting* -(cancel)-> Clock
//! ```
//!
//! Exactly one state is active; a request for another mode while not in
//! `Clock` is ignored.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::countdown::{AlarmTarget, Countdown, Step};
use super::time::WallClock;
use crate::error::InputError;
use crate::events::Event;
use crate::input::{Field, InputForm};
use crate::notify::{ExpiryKind, Notification, Notifier, SoundCue};
use crate::present::Frame;
use crate::ticker::Ticker;

/// Default countdown offered when the timer form opens.
pub const DEFAULT_TIMER_MINUTES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Clock,
    AwaitingTimerInput,
    AwaitingAlarmInput,
    TimerRunning,
    AlarmArmed,
}

/// Coarse display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Clock,
    Timer,
    Alarm,
}

/// State plus the data that is only meaningful in that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Clock,
    AwaitingTimer(InputForm),
    AwaitingAlarm(InputForm),
    TimerRunning {
        remaining: Countdown,
        armed: Countdown,
    },
    AlarmArmed {
        target: AlarmTarget,
    },
}

impl Phase {
    fn state(&self) -> EngineState {
        match self {
            Phase::Clock => EngineState::Clock,
            Phase::AwaitingTimer(_) => EngineState::AwaitingTimerInput,
            Phase::AwaitingAlarm(_) => EngineState::AwaitingAlarmInput,
            Phase::TimerRunning { .. } => EngineState::TimerRunning,
            Phase::AlarmArmed { .. } => EngineState::AlarmArmed,
        }
    }
}

/// Core mode engine.
///
/// All methods take `&mut self`; callers serialize commands and ticks on
/// a single event loop.
pub struct ModeEngine<C: WallClock, T: Ticker> {
    clock: C,
    ticker: T,
    notifier: Arc<dyn Notifier>,
    cue: SoundCue,
    timer_defaults: Countdown,
    phase: Phase,
}

impl<C: WallClock, T: Ticker> ModeEngine<C, T> {
    /// Create an engine in `Clock` state. The ticker is not started until
    /// [`ModeEngine::start`].
    pub fn new(clock: C, ticker: T, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            clock,
            ticker,
            notifier,
            cue: SoundCue::default(),
            timer_defaults: Countdown::new(DEFAULT_TIMER_MINUTES, 0),
            phase: Phase::Clock,
        }
    }

    pub fn with_cue(mut self, cue: SoundCue) -> Self {
        self.cue = cue;
        self
    }

    pub fn with_timer_defaults(mut self, minutes: u32, seconds: u32) -> Self {
        self.timer_defaults = Countdown::new(
            minutes.min(Field::Minute.max()),
            seconds.min(Field::Second.max()),
        );
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.phase.state()
    }

    pub fn mode(&self) -> Mode {
        match self.phase {
            Phase::Clock => Mode::Clock,
            Phase::AwaitingTimer(_) | Phase::TimerRunning { .. } => Mode::Timer,
            Phase::AwaitingAlarm(_) | Phase::AlarmArmed { .. } => Mode::Alarm,
        }
    }

    /// True while a form is open and the ticker is suspended.
    pub fn awaiting_input(&self) -> bool {
        matches!(self.phase, Phase::AwaitingTimer(_) | Phase::AwaitingAlarm(_))
    }

    pub fn form(&self) -> Option<InputForm> {
        match self.phase {
            Phase::AwaitingTimer(form) | Phase::AwaitingAlarm(form) => Some(form),
            _ => None,
        }
    }

    pub fn remaining(&self) -> Option<Countdown> {
        match self.phase {
            Phase::TimerRunning { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    /// The countdown as originally requested.
    pub fn armed_duration(&self) -> Option<Countdown> {
        match self.phase {
            Phase::TimerRunning { armed, .. } => Some(armed),
            _ => None,
        }
    }

    pub fn alarm_target(&self) -> Option<AlarmTarget> {
        match self.phase {
            Phase::AlarmArmed { target } => Some(target),
            _ => None,
        }
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// What the presentation adapter should show right now.
    pub fn frame(&self) -> Frame {
        let display = match self.phase {
            Phase::TimerRunning { remaining, .. } => remaining.display(),
            _ => self.clock.now().to_string(),
        };
        let alarm_label = self.alarm_target().map(|t| t.to_string());
        Frame {
            state: self.state(),
            display,
            alarm_indicator: alarm_label.is_some(),
            alarm_label,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin ticking in clock mode.
    pub fn start(&mut self) -> Event {
        self.ticker.start();
        Event::Frame(self.frame())
    }

    pub fn request_timer(&mut self) -> Option<Event> {
        if self.phase != Phase::Clock {
            debug!(state = ?self.state(), "timer request ignored");
            return None;
        }
        self.ticker.stop();
        let form = InputForm::timer(
            self.timer_defaults.minutes(),
            self.timer_defaults.seconds() as u32,
        );
        self.phase = Phase::AwaitingTimer(form);
        debug!("awaiting timer input");
        Some(Event::InputRequested {
            form,
            at: Utc::now(),
        })
    }

    pub fn request_alarm(&mut self) -> Option<Event> {
        if self.phase != Phase::Clock {
            debug!(state = ?self.state(), "alarm request ignored");
            return None;
        }
        self.ticker.stop();
        let now = self.clock.now();
        let form = InputForm::alarm(now.hour as u32, now.minute as u32);
        self.phase = Phase::AwaitingAlarm(form);
        debug!("awaiting alarm input");
        Some(Event::InputRequested {
            form,
            at: Utc::now(),
        })
    }

    /// Arm a countdown of `minutes:seconds`.
    ///
    /// The arming tick runs immediately, so the next frame shows the
    /// requested value and expiry lands on the `minutes * 60 + seconds`-th
    /// periodic tick.
    pub fn confirm_timer(&mut self, minutes: u32, seconds: u32) -> Result<Event, InputError> {
        if !matches!(self.phase, Phase::AwaitingTimer(_)) {
            return Err(InputError::NotAwaiting("timer"));
        }
        if seconds > Field::Second.max() {
            return Err(InputError::OutOfRange {
                field: Field::Second,
                value: seconds,
                max: Field::Second.max(),
            });
        }
        if minutes == 0 && seconds == 0 {
            return Err(InputError::ZeroDuration);
        }

        let armed = Countdown::new(minutes, seconds);
        self.phase = Phase::TimerRunning {
            remaining: armed.padded(),
            armed,
        };
        self.tick();
        self.ticker.start();
        info!(duration = %armed, "timer armed");
        Ok(Event::TimerArmed {
            duration: armed,
            at: Utc::now(),
        })
    }

    pub fn confirm_alarm(&mut self, hour: u32, minute: u32) -> Result<Event, InputError> {
        if !matches!(self.phase, Phase::AwaitingAlarm(_)) {
            return Err(InputError::NotAwaiting("alarm"));
        }
        for (field, value) in [(Field::Hour, hour), (Field::Minute, minute)] {
            if value > field.max() {
                return Err(InputError::OutOfRange {
                    field,
                    value,
                    max: field.max(),
                });
            }
        }
        let target = AlarmTarget::new(hour as u8, minute as u8).ok_or(
            InputError::OutOfRange {
                field: Field::Hour,
                value: hour,
                max: Field::Hour.max(),
            },
        )?;

        self.phase = Phase::AlarmArmed { target };
        self.ticker.start();
        info!(%target, "alarm armed");
        Ok(Event::AlarmArmed {
            target,
            at: Utc::now(),
        })
    }

    /// Abandon an open form and resume the clock. No-op otherwise.
    pub fn cancel(&mut self) -> Option<Event> {
        if !self.awaiting_input() {
            return None;
        }
        let from = self.state();
        self.phase = Phase::Clock;
        self.ticker.start();
        debug!(?from, "input cancelled");
        Some(Event::Cancelled {
            from,
            at: Utc::now(),
        })
    }

    /// Silently stop a running timer or armed alarm. No-op otherwise.
    pub fn stop(&mut self) -> Option<Event> {
        if !matches!(
            self.phase,
            Phase::TimerRunning { .. } | Phase::AlarmArmed { .. }
        ) {
            return None;
        }
        let from = self.state();
        self.phase = Phase::Clock;
        info!(?from, "stopped");
        Some(Event::Cancelled {
            from,
            at: Utc::now(),
        })
    }

    /// Honoured only in `Clock`, so editing or counting down can't be
    /// quit by accident.
    pub fn quit(&mut self) -> Option<Event> {
        if self.phase != Phase::Clock {
            debug!(state = ?self.state(), "quit ignored");
            return None;
        }
        self.ticker.stop();
        Some(Event::QuitRequested { at: Utc::now() })
    }

    /// Escape key: cancels an open form, otherwise asks to quit.
    pub fn escape(&mut self) -> Option<Event> {
        if self.awaiting_input() {
            self.cancel()
        } else {
            self.quit()
        }
    }

    /// Advance one tick. Returns `Some(Event::Expired)` at most once per
    /// arming; the engine is back in `Clock` before it returns.
    pub fn tick(&mut self) -> Option<Event> {
        match &mut self.phase {
            Phase::TimerRunning { remaining, armed } => {
                let armed = *armed;
                match remaining.step() {
                    Step::Running => None,
                    Step::Finished | Step::Exhausted => Some(self.expire(
                        ExpiryKind::Timer,
                        format!("Your countdown for {armed} finished!"),
                    )),
                }
            }
            Phase::AlarmArmed { target } => {
                if target.matches(self.clock.now()) {
                    Some(self.expire(
                        ExpiryKind::Alarm,
                        "Your alarm time has arrived!".to_string(),
                    ))
                } else {
                    None
                }
            }
            Phase::Clock | Phase::AwaitingTimer(_) | Phase::AwaitingAlarm(_) => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire(&mut self, kind: ExpiryKind, message: String) -> Event {
        self.phase = Phase::Clock;
        info!(?kind, %message, "expired");
        self.notifier.notify(&Notification {
            kind,
            message: message.clone(),
            cue: self.cue.clone(),
        });
        Event::Expired {
            kind,
            message,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::time::ManualClock;
    use crate::notify::RecordingNotifier;
    use crate::ticker::ManualTicker;

    fn engine_at(
        h: u8,
        m: u8,
        s: u8,
    ) -> (ModeEngine<ManualClock, ManualTicker>, Arc<RecordingNotifier>) {
        let notifier = RecordingNotifier::new();
        let mut engine = ModeEngine::new(
            ManualClock::at(h, m, s),
            ManualTicker::new(),
            notifier.clone(),
        );
        engine.start();
        (engine, notifier)
    }

    #[test]
    fn starts_in_clock_with_ticker_running() {
        let (engine, _) = engine_at(9, 15, 0);
        assert_eq!(engine.state(), EngineState::Clock);
        assert_eq!(engine.mode(), Mode::Clock);
        assert!(engine.ticker().is_running());
        assert_eq!(engine.frame().display, "09:15:00");
        assert!(!engine.frame().alarm_indicator);
    }

    #[test]
    fn request_timer_offers_defaults_and_stops_ticker() {
        let (mut engine, _) = engine_at(9, 15, 0);
        let event = engine.request_timer().unwrap();
        match event {
            Event::InputRequested { form, .. } => assert_eq!(form, InputForm::timer(10, 0)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(engine.state(), EngineState::AwaitingTimerInput);
        assert!(engine.awaiting_input());
        assert!(!engine.ticker().is_running());
    }

    #[test]
    fn request_alarm_prefills_current_time() {
        let (mut engine, _) = engine_at(14, 29, 58);
        engine.request_alarm();
        assert_eq!(engine.form(), Some(InputForm::alarm(14, 29)));
        assert_eq!(engine.mode(), Mode::Alarm);
    }

    #[test]
    fn configured_timer_defaults_are_offered() {
        let (engine, _) = engine_at(0, 0, 0);
        let mut engine = engine.with_timer_defaults(25, 30);
        engine.request_timer();
        assert_eq!(engine.form(), Some(InputForm::timer(25, 30)));
    }

    #[test]
    fn oversized_timer_defaults_are_clamped_to_form_limits() {
        let (engine, _) = engine_at(0, 0, 0);
        let mut engine = engine.with_timer_defaults(75, 80);
        engine.request_timer();
        let form = engine.form().unwrap();
        assert_eq!(form, InputForm::timer(59, 59));

        engine.confirm_timer(form.first, form.second).unwrap();
        assert_eq!(engine.state(), EngineState::TimerRunning);
    }

    #[test]
    fn confirm_timer_shows_requested_value() {
        let (mut engine, _) = engine_at(0, 0, 0);
        engine.request_timer();
        engine.confirm_timer(10, 0).unwrap();
        assert_eq!(engine.state(), EngineState::TimerRunning);
        assert_eq!(engine.frame().display, "00:10:00");
        assert_eq!(engine.armed_duration(), Some(Countdown::new(10, 0)));
        assert!(engine.ticker().is_running());

        engine.tick();
        assert_eq!(engine.frame().display, "00:09:59");
    }

    #[test]
    fn confirm_timer_zero_is_rejected() {
        let (mut engine, notifier) = engine_at(0, 0, 0);
        engine.request_timer();
        assert_eq!(engine.confirm_timer(0, 0), Err(InputError::ZeroDuration));
        assert_eq!(engine.state(), EngineState::AwaitingTimerInput);
        assert!(!engine.ticker().is_running());
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn confirm_timer_rejects_bad_seconds() {
        let (mut engine, _) = engine_at(0, 0, 0);
        engine.request_timer();
        let err = engine.confirm_timer(1, 60).unwrap_err();
        assert_eq!(err.field(), Some(Field::Second));
        assert_eq!(engine.state(), EngineState::AwaitingTimerInput);
    }

    #[test]
    fn confirm_without_form_is_refused() {
        let (mut engine, _) = engine_at(0, 0, 0);
        assert_eq!(
            engine.confirm_timer(1, 0),
            Err(InputError::NotAwaiting("timer"))
        );
        engine.request_timer();
        assert_eq!(
            engine.confirm_alarm(1, 0),
            Err(InputError::NotAwaiting("alarm"))
        );
        assert_eq!(engine.state(), EngineState::AwaitingTimerInput);
    }

    #[test]
    fn timer_expires_on_last_tick_exactly_once() {
        let (mut engine, notifier) = engine_at(0, 0, 0);
        engine.request_timer();
        engine.confirm_timer(0, 3).unwrap();

        assert!(engine.tick().is_none());
        assert_eq!(engine.frame().display, "00:00:02");
        assert!(engine.tick().is_none());
        assert_eq!(engine.frame().display, "00:00:01");
        match engine.tick() {
            Some(Event::Expired { kind, message, .. }) => {
                assert_eq!(kind, ExpiryKind::Timer);
                assert!(message.contains("00:03"), "{message}");
            }
            other => panic!("expected expiry, got {other:?}"),
        }
        assert_eq!(engine.state(), EngineState::Clock);
        assert!(engine.tick().is_none());
        assert_eq!(notifier.count(), 1);
        assert!(engine.ticker().is_running());
    }

    #[test]
    fn timer_with_59_seconds_counts_full_duration() {
        let (mut engine, notifier) = engine_at(0, 0, 0);
        engine.request_timer();
        engine.confirm_timer(0, 59).unwrap();
        assert_eq!(engine.frame().display, "00:00:59");
        for _ in 0..58 {
            assert!(engine.tick().is_none());
        }
        assert!(engine.tick().is_some());
        assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn alarm_fires_at_second_zero_only() {
        let (mut engine, notifier) = engine_at(14, 29, 58);
        engine.request_alarm();
        engine.confirm_alarm(14, 30).unwrap();
        assert!(engine.frame().alarm_indicator);
        assert_eq!(engine.frame().alarm_label.as_deref(), Some("14:30"));

        let mut fired_at = Vec::new();
        for _ in 0..4 {
            engine.clock().advance_secs(1);
            if engine.tick().is_some() {
                fired_at.push(engine.clock().now().to_string());
            }
        }
        assert_eq!(fired_at, vec!["14:30:00".to_string()]);
        assert_eq!(notifier.count(), 1);
        assert_eq!(notifier.received()[0].kind, ExpiryKind::Alarm);
        assert_eq!(engine.state(), EngineState::Clock);
        assert!(!engine.frame().alarm_indicator);
    }

    #[test]
    fn alarm_armed_mid_minute_waits() {
        let (mut engine, notifier) = engine_at(14, 30, 1);
        engine.request_alarm();
        engine.confirm_alarm(14, 30).unwrap();
        for _ in 0..59 {
            engine.clock().advance_secs(1);
            engine.tick();
        }
        assert_eq!(notifier.count(), 0);
        assert_eq!(engine.state(), EngineState::AlarmArmed);
    }

    #[test]
    fn confirm_alarm_rejects_out_of_range() {
        let (mut engine, _) = engine_at(0, 0, 0);
        engine.request_alarm();
        let err = engine.confirm_alarm(24, 0).unwrap_err();
        assert_eq!(err.field(), Some(Field::Hour));
        let err = engine.confirm_alarm(23, 60).unwrap_err();
        assert_eq!(err.field(), Some(Field::Minute));
        assert_eq!(engine.state(), EngineState::AwaitingAlarmInput);
    }

    #[test]
    fn stop_cancels_silently() {
        let (mut engine, notifier) = engine_at(14, 29, 59);
        engine.request_timer();
        engine.confirm_timer(0, 1).unwrap();
        assert!(engine.stop().is_some());
        assert_eq!(engine.state(), EngineState::Clock);
        assert!(engine.tick().is_none());

        engine.request_alarm();
        engine.confirm_alarm(14, 30).unwrap();
        assert!(engine.stop().is_some());
        engine.clock().advance_secs(1);
        assert!(engine.tick().is_none());
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn stop_in_clock_and_double_cancel_are_noops() {
        let (mut engine, _) = engine_at(0, 0, 0);
        assert!(engine.stop().is_none());
        engine.request_timer();
        assert!(engine.cancel().is_some());
        assert!(engine.cancel().is_none());
        assert_eq!(engine.state(), EngineState::Clock);
        assert!(engine.ticker().is_running());
    }

    #[test]
    fn cancel_before_first_tick_restarts_ticker() {
        let (mut engine, notifier) = engine_at(0, 0, 0);
        engine.request_timer();
        assert!(!engine.ticker().is_running());
        engine.cancel();
        assert!(engine.ticker().is_running());
        assert_eq!(engine.ticker().starts(), 2);
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn modes_are_exclusive() {
        let (mut engine, _) = engine_at(0, 0, 0);
        engine.request_timer();
        assert!(engine.request_alarm().is_none());
        engine.confirm_timer(5, 0).unwrap();
        assert!(engine.request_alarm().is_none());
        assert!(engine.request_timer().is_none());
        assert_eq!(engine.state(), EngineState::TimerRunning);
    }

    #[test]
    fn quit_only_from_clock() {
        let (mut engine, _) = engine_at(0, 0, 0);
        engine.request_timer();
        assert!(engine.quit().is_none());
        assert_eq!(engine.state(), EngineState::AwaitingTimerInput);
        engine.confirm_timer(1, 0).unwrap();
        assert!(engine.quit().is_none());
        engine.stop();
        assert!(matches!(engine.quit(), Some(Event::QuitRequested { .. })));
        assert!(!engine.ticker().is_running());
    }

    #[test]
    fn escape_cancels_form_before_quitting() {
        let (mut engine, _) = engine_at(0, 0, 0);
        engine.request_alarm();
        assert!(matches!(engine.escape(), Some(Event::Cancelled { .. })));
        assert!(matches!(engine.escape(), Some(Event::QuitRequested { .. })));
    }
}
