//! Property tests for countdown timing.

use std::sync::Arc;

use deskclock_core::notify::RecordingNotifier;
use deskclock_core::{EngineState, ManualClock, ManualTicker, ModeEngine};
use proptest::prelude::*;

fn armed(minutes: u32, seconds: u32) -> (ModeEngine<ManualClock, ManualTicker>, Arc<RecordingNotifier>) {
    let notifier = RecordingNotifier::new();
    let mut engine = ModeEngine::new(ManualClock::at(0, 0, 0), ManualTicker::new(), notifier.clone());
    engine.start();
    engine.request_timer().unwrap();
    engine.confirm_timer(minutes, seconds).unwrap();
    (engine, notifier)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn expires_exactly_on_requested_tick(minutes in 0u32..8, seconds in 0u32..60) {
        prop_assume!(minutes != 0 || seconds != 0);
        let (mut engine, notifier) = armed(minutes, seconds);
        let total = minutes * 60 + seconds;

        for _ in 0..total - 1 {
            prop_assert!(engine.tick().is_none());
        }
        prop_assert_eq!(engine.state(), EngineState::TimerRunning);
        prop_assert_eq!(notifier.count(), 0);

        prop_assert!(engine.tick().is_some());
        prop_assert_eq!(engine.state(), EngineState::Clock);

        for _ in 0..5 {
            prop_assert!(engine.tick().is_none());
        }
        prop_assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn remaining_seconds_stay_in_range(minutes in 0u32..3, seconds in 1u32..60, ticks in 0usize..240) {
        let (mut engine, _) = armed(minutes, seconds);
        for _ in 0..ticks {
            engine.tick();
            if let Some(remaining) = engine.remaining() {
                prop_assert!(remaining.seconds() <= 59);
                prop_assert!(remaining.total_secs() <= (minutes * 60 + seconds) as u64);
            }
        }
    }
}
