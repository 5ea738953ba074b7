//! Cooperative event loop.
//!
//! Input commands and ticker signals are handled one at a time on a single
//! task, so no two transitions or ticks ever interleave.

use tokio::sync::mpsc;
use tracing::debug;

use crate::clock::{EngineState, ModeEngine, WallClock};
use crate::error::InputError;
use crate::events::Event;
use crate::input::{parse_pair, Command, FormKind};
use crate::present::Presenter;
use crate::ticker::{TickSignal, Ticker};

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The engine accepted a quit.
    Quit,
    /// The command source went away.
    InputClosed,
}

/// Apply one command and forward the results to the presenter.
///
/// Returns `true` once the engine has accepted a quit.
pub fn dispatch<C, T, P>(engine: &mut ModeEngine<C, T>, command: Command, presenter: &mut P) -> bool
where
    C: WallClock,
    T: Ticker,
    P: Presenter + ?Sized,
{
    debug!(?command, "command");
    let event = match command {
        Command::RequestTimer => engine.request_timer(),
        Command::RequestAlarm => engine.request_alarm(),
        Command::Cancel => engine.cancel(),
        Command::Stop => engine.stop(),
        Command::Quit => engine.quit(),
        Command::Escape => engine.escape(),
        Command::Entry(text) => submit(engine, &text, presenter),
        Command::Accept => match engine.form() {
            Some(form) => submit(engine, &form.placeholder(), presenter),
            None => None,
        },
    };
    let Some(event) = event else {
        return false;
    };
    present(engine, &event, presenter)
}

/// Confirm `text` against the open form. A rejection is reported and the
/// form prompted again.
fn submit<C, T, P>(engine: &mut ModeEngine<C, T>, text: &str, presenter: &mut P) -> Option<Event>
where
    C: WallClock,
    T: Ticker,
    P: Presenter + ?Sized,
{
    match confirm(engine, text) {
        Ok(event) => Some(event),
        Err(err) => {
            presenter.reject(&err);
            if let Some(form) = engine.form() {
                presenter.prompt(&form);
            }
            None
        }
    }
}

fn confirm<C: WallClock, T: Ticker>(
    engine: &mut ModeEngine<C, T>,
    text: &str,
) -> Result<Event, InputError> {
    match engine.state() {
        EngineState::AwaitingTimerInput => {
            let (minutes, seconds) = parse_pair(text, FormKind::Timer)?;
            engine.confirm_timer(minutes, seconds)
        }
        EngineState::AwaitingAlarmInput => {
            let (hour, minute) = parse_pair(text, FormKind::Alarm)?;
            engine.confirm_alarm(hour, minute)
        }
        _ => Err(InputError::NotAwaiting("timer or alarm")),
    }
}

/// Route an event; returns `true` for an accepted quit.
fn present<C, T, P>(engine: &ModeEngine<C, T>, event: &Event, presenter: &mut P) -> bool
where
    C: WallClock,
    T: Ticker,
    P: Presenter + ?Sized,
{
    match event {
        Event::InputRequested { form, .. } => {
            presenter.prompt(form);
            false
        }
        Event::QuitRequested { .. } => {
            presenter.notice(event);
            true
        }
        Event::Frame(frame) => {
            presenter.render(frame);
            false
        }
        _ => {
            presenter.notice(event);
            presenter.render(&engine.frame());
            false
        }
    }
}

/// Handle one ticker signal: tick, report any expiry, redraw.
pub fn on_tick<C, T, P>(engine: &mut ModeEngine<C, T>, signal: TickSignal, presenter: &mut P)
where
    C: WallClock,
    T: Ticker,
    P: Presenter + ?Sized,
{
    if !engine.ticker().is_current(signal) {
        debug!(generation = signal.generation, "stale tick dropped");
        return;
    }
    if let Some(expired) = engine.tick() {
        presenter.notice(&expired);
    }
    presenter.render(&engine.frame());
}

/// Run until quit, or until `commands` closes and nothing is left armed.
///
/// Starts the engine's ticker and draws the first frame before waiting.
/// Once `commands` closes, a running timer or armed alarm keeps ticking
/// until it fires; an open form can never be completed, so the loop ends.
pub async fn run<C, T, P>(
    engine: &mut ModeEngine<C, T>,
    commands: &mut mpsc::Receiver<Command>,
    ticks: &mut mpsc::UnboundedReceiver<TickSignal>,
    presenter: &mut P,
) -> Exit
where
    C: WallClock,
    T: Ticker,
    P: Presenter + ?Sized,
{
    let first = engine.start();
    present(engine, &first, presenter);

    let mut input_open = true;
    let mut ticks_open = true;
    loop {
        if !input_open && !(ticks_open && counting_down(engine)) {
            return Exit::InputClosed;
        }
        tokio::select! {
            biased;
            command = commands.recv(), if input_open => {
                let Some(command) = command else {
                    debug!(state = ?engine.state(), "command source closed");
                    input_open = false;
                    continue;
                };
                if dispatch(engine, command, presenter) {
                    return Exit::Quit;
                }
            }
            signal = ticks.recv(), if ticks_open => match signal {
                Some(signal) => on_tick(engine, signal, presenter),
                None => ticks_open = false,
            },
        }
    }
}

fn counting_down<C: WallClock, T: Ticker>(engine: &ModeEngine<C, T>) -> bool {
    matches!(
        engine.state(),
        EngineState::TimerRunning | EngineState::AlarmArmed
    )
}
