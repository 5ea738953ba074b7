//! Expiry notifications.
//!
//! The engine decides *that* a notification fires and *what* it says; a
//! [`Notifier`] decides how it is delivered. Delivery is fire-and-forget:
//! nothing a notifier does can reach back into engine state.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::config::NotificationsConfig;

/// Sounds tried, in order, when no custom sound is configured.
const DEFAULT_SOUNDS: &[&str] = &[
    "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga",
    "/usr/share/sounds/freedesktop/stereo/complete.oga",
    "/usr/share/sounds/sound-icons/guitar-11.wav",
    "/System/Library/Sounds/Glass.aiff",
];

/// Audio players tried, in order, for a sound file.
const PLAYERS: &[&str] = &["paplay", "aplay", "afplay"];

/// Opaque handle to the sound played alongside a notification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum SoundCue {
    /// First system sound found on this host
    #[default]
    System,
    File(PathBuf),
    Silent,
}

impl SoundCue {
    pub fn from_config(config: &NotificationsConfig) -> Self {
        if !config.sound {
            return SoundCue::Silent;
        }
        match &config.custom_sound {
            Some(path) if !path.is_empty() => SoundCue::File(PathBuf::from(path)),
            _ => SoundCue::System,
        }
    }

    fn resolve(&self) -> Option<PathBuf> {
        match self {
            SoundCue::System => DEFAULT_SOUNDS
                .iter()
                .map(|p| Path::new(*p))
                .find(|p| p.exists())
                .map(Path::to_path_buf),
            SoundCue::File(path) => Some(path.clone()),
            SoundCue::Silent => None,
        }
    }
}

/// What expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryKind {
    Timer,
    Alarm,
}

/// A message plus the sound cue to play with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: ExpiryKind,
    pub message: String,
    pub cue: SoundCue,
}

/// Delivers notifications.
///
/// Implementations must return promptly and tolerate being called again
/// while an earlier delivery is still in flight.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Desktop banner via `notify-rust` plus a sound played by an external
/// player, both on a background thread.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    title: String,
    timeout_secs: u32,
}

impl DesktopNotifier {
    pub fn new(title: impl Into<String>, timeout_secs: u32) -> Self {
        Self {
            title: title.into(),
            timeout_secs,
        }
    }

    fn deliver(title: &str, timeout_secs: u32, notification: &Notification) {
        let shown = notify_rust::Notification::new()
            .summary(title)
            .body(&notification.message)
            .appname("deskclock")
            .icon("alarm-clock")
            .timeout(banner_timeout(timeout_secs))
            .show();
        if let Err(e) = shown {
            warn!(error = %e, "desktop notification failed");
        }

        let Some(sound) = notification.cue.resolve() else {
            debug!("no sound to play");
            return;
        };
        if !sound.exists() {
            warn!(path = %sound.display(), "sound file missing");
            return;
        }
        play(&sound);
    }
}

fn banner_timeout(secs: u32) -> notify_rust::Timeout {
    notify_rust::Timeout::Milliseconds(secs.saturating_mul(1000))
}

fn play(sound: &Path) {
    for &player in PLAYERS {
        let status = Command::new(player)
            .arg(sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => return,
            Ok(status) => debug!(player, %status, "player exited unsuccessfully"),
            Err(e) => debug!(player, error = %e, "player unavailable"),
        }
    }
    warn!(path = %sound.display(), "no audio player could play sound");
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) {
        let title = self.title.clone();
        let timeout_secs = self.timeout_secs;
        let notification = notification.clone();
        let spawned = std::thread::Builder::new()
            .name("deskclock-notify".into())
            .spawn(move || Self::deliver(&title, timeout_secs, &notification));
        if let Err(e) = spawned {
            warn!(error = %e, "could not start notification thread");
        }
    }
}

/// Only logs; used when notifications are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        info!(kind = ?notification.kind, message = %notification.message, "expired");
    }
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn received(&self) -> Vec<Notification> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.received.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification.clone());
        }
    }
}

/// Pick a notifier for the given settings.
pub fn from_config(config: &NotificationsConfig) -> Arc<dyn Notifier> {
    if config.enabled {
        Arc::new(DesktopNotifier::new(
            config.title.clone(),
            config.timeout_secs,
        ))
    } else {
        Arc::new(LogNotifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_timeout_saturates() {
        assert!(matches!(
            banner_timeout(5),
            notify_rust::Timeout::Milliseconds(5000)
        ));
        assert!(matches!(
            banner_timeout(u32::MAX),
            notify_rust::Timeout::Milliseconds(u32::MAX)
        ));
    }

    #[test]
    fn cue_follows_config() {
        let mut cfg = NotificationsConfig::default();
        assert_eq!(SoundCue::from_config(&cfg), SoundCue::System);

        cfg.custom_sound = Some("/tmp/beep.wav".into());
        assert_eq!(
            SoundCue::from_config(&cfg),
            SoundCue::File(PathBuf::from("/tmp/beep.wav"))
        );

        cfg.sound = false;
        assert_eq!(SoundCue::from_config(&cfg), SoundCue::Silent);
    }

    #[test]
    fn silent_cue_resolves_to_nothing() {
        assert_eq!(SoundCue::Silent.resolve(), None);
    }

    #[test]
    fn recording_notifier_tolerates_overlapping_calls() {
        let recorder = RecordingNotifier::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let recorder = Arc::clone(&recorder);
                std::thread::spawn(move || {
                    recorder.notify(&Notification {
                        kind: ExpiryKind::Timer,
                        message: format!("n{i}"),
                        cue: SoundCue::Silent,
                    })
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(recorder.count(), 4);
    }

    #[test]
    fn cue_serializes_tagged() {
        let json = serde_json::to_string(&SoundCue::File("/a.wav".into())).unwrap();
        assert_eq!(json, r#"{"kind":"file","path":"/a.wav"}"#);
    }
}
