//! Periodic tick scheduling.
//!
//! A [`Ticker`] is owned by the mode engine and started/stopped by it. Each
//! start opens a new *generation*; signals from an older generation are
//! stale and must be dropped, which is what keeps a stop/start pair from
//! double-firing.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::clock::time::millis_to_next_second;

/// Fixed period when not aligning to wall-clock seconds.
pub const TICK_PERIOD_MS: u64 = 1000;

/// Landing just past the boundary keeps the displayed second stable.
const ALIGN_MARGIN_MS: u64 = 5;

/// One tick, stamped with the ticker generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSignal {
    pub generation: u64,
}

pub trait Ticker {
    /// Start ticking. No-op when already running.
    fn start(&mut self);
    /// Stop ticking. No-op when already stopped.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Whether a signal belongs to the current, running generation.
    fn is_current(&self, signal: TickSignal) -> bool;
}

/// Tokio-backed ticker delivering [`TickSignal`]s over an unbounded channel.
///
/// Must be started from within a tokio runtime.
#[derive(Debug)]
pub struct TokioTicker {
    tx: mpsc::UnboundedSender<TickSignal>,
    align_to_second: bool,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl TokioTicker {
    /// Create a stopped ticker and the receiver its signals arrive on.
    pub fn channel(align_to_second: bool) -> (Self, mpsc::UnboundedReceiver<TickSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = Self {
            tx,
            align_to_second,
            generation: 0,
            task: None,
        };
        (ticker, rx)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn next_delay(align_to_second: bool) -> Duration {
    if align_to_second {
        Duration::from_millis(millis_to_next_second() + ALIGN_MARGIN_MS)
    } else {
        Duration::from_millis(TICK_PERIOD_MS)
    }
}

impl Ticker for TokioTicker {
    fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        self.generation += 1;
        let generation = self.generation;
        let align = self.align_to_second;
        let tx = self.tx.clone();
        debug!(generation, align, "ticker started");
        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(next_delay(align)).await;
                if tx.send(TickSignal { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(generation = self.generation, "ticker stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.task.is_some()
    }

    fn is_current(&self, signal: TickSignal) -> bool {
        self.task.is_some() && signal.generation == self.generation
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ticker that only records what the engine asked of it.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    running: bool,
    generation: u64,
    starts: usize,
    stops: usize,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal for the current generation, as a running ticker would send.
    pub fn signal(&self) -> TickSignal {
        TickSignal {
            generation: self.generation,
        }
    }

    /// Effective starts (ignoring no-op calls).
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Effective stops (ignoring no-op calls).
    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.generation += 1;
            self.starts += 1;
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn is_current(&self, signal: TickSignal) -> bool {
        self.running && signal.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_start_stop_are_idempotent() {
        let mut ticker = ManualTicker::new();
        ticker.stop();
        assert_eq!(ticker.stops(), 0);
        ticker.start();
        ticker.start();
        assert_eq!(ticker.starts(), 1);
        ticker.stop();
        ticker.stop();
        assert_eq!(ticker.stops(), 1);
        assert!(!ticker.is_running());
    }

    #[test]
    fn manual_restart_invalidates_old_signals() {
        let mut ticker = ManualTicker::new();
        ticker.start();
        let old = ticker.signal();
        ticker.stop();
        assert!(!ticker.is_current(old));
        ticker.start();
        assert!(!ticker.is_current(old));
        assert!(ticker.is_current(ticker.signal()));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_fires_once_per_period() {
        let (mut ticker, mut rx) = TokioTicker::channel(false);
        ticker.start();
        ticker.start();

        tokio::time::sleep(Duration::from_millis(3 * TICK_PERIOD_MS + 10)).await;
        let mut got = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            got.push(signal);
        }
        assert_eq!(got.len(), 3);
        assert!(got.iter().all(|s| ticker.is_current(*s)));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_restart_drops_stale_generation() {
        let (mut ticker, mut rx) = TokioTicker::channel(false);
        ticker.start();
        tokio::time::sleep(Duration::from_millis(TICK_PERIOD_MS + 10)).await;
        ticker.stop();
        ticker.stop();
        ticker.start();
        assert_eq!(ticker.generation(), 2);

        tokio::time::sleep(Duration::from_millis(TICK_PERIOD_MS + 10)).await;
        let mut current = 0;
        let mut stale = 0;
        while let Ok(signal) = rx.try_recv() {
            if ticker.is_current(signal) {
                current += 1;
            } else {
                stale += 1;
            }
        }
        assert_eq!(stale, 1);
        assert_eq!(current, 1);
    }
}
