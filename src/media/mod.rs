//! Media element boundary.
//!
//! The playback state machine drives a `MediaElement`; the terminal shell uses
//! the clock-driven `PreviewPlayer`. Times are seconds as `f64`, matching the
//! scrubber's resolution.

use std::time::Instant;
use thiserror::Error;

/// Reasons a `play()` request can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Unmuted playback was requested before any user gesture.
    #[error("Autoplay with sound is blocked until the user interacts")]
    AutoplayBlocked,
    /// The media cannot be played (still images).
    #[error("Media is not playable")]
    NotPlayable,
}

/// A single playable media element.
pub trait MediaElement: Send {
    /// Start or resume playback.
    fn play(&mut self, now: Instant) -> Result<(), PlaybackError>;
    /// Pause playback, keeping the position.
    fn pause(&mut self, now: Instant);
    /// Jump to `seconds`, clamped to the media's range.
    fn seek(&mut self, seconds: f64, now: Instant);
    /// Set the volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    /// Mute or unmute without changing the volume.
    fn set_muted(&mut self, muted: bool);
    /// Record that a user gesture happened (unlocks unmuted autoplay).
    fn activate(&mut self) {}
    /// Playback position in seconds at `now`.
    fn current_time(&self, now: Instant) -> f64;
    /// `None` until metadata is known.
    fn duration(&self) -> Option<f64>;
    /// Whether playback is stopped.
    fn is_paused(&self) -> bool;
}

/// When the host allows playback to start without a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayPolicy {
    /// Muted playback always allowed, unmuted only after a gesture.
    MutedOnly,
    /// Always allowed.
    Allow,
}

/// Looping, clock-driven stand-in for a video element.
///
/// Position advances with wall time while playing. Metadata (duration) is
/// available immediately.
#[derive(Debug, Clone)]
pub struct PreviewPlayer {
    duration: f64,
    position: f64,
    playing_since: Option<Instant>,
    volume: f32,
    muted: bool,
    activated: bool,
    policy: AutoplayPolicy,
}

impl PreviewPlayer {
    /// Player for a clip of `duration_secs`, starting muted and paused.
    pub fn new(duration_secs: f64, policy: AutoplayPolicy) -> Self {
        Self {
            duration: duration_secs.max(0.1),
            position: 0.0,
            playing_since: None,
            volume: 1.0,
            muted: true,
            activated: false,
            policy,
        }
    }

    fn position_at(&self, now: Instant) -> f64 {
        match self.playing_since {
            Some(since) => {
                let elapsed = now.saturating_duration_since(since).as_secs_f64();
                (self.position + elapsed) % self.duration
            }
            None => self.position,
        }
    }

    /// Current element volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Whether the element is muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl MediaElement for PreviewPlayer {
    fn play(&mut self, now: Instant) -> Result<(), PlaybackError> {
        if self.policy == AutoplayPolicy::MutedOnly && !self.muted && !self.activated {
            return Err(PlaybackError::AutoplayBlocked);
        }
        if self.playing_since.is_none() {
            self.playing_since = Some(now);
        }
        Ok(())
    }

    fn pause(&mut self, now: Instant) {
        self.position = self.position_at(now);
        self.playing_since = None;
    }

    fn seek(&mut self, seconds: f64, now: Instant) {
        self.position = seconds.clamp(0.0, self.duration);
        if self.playing_since.is_some() {
            self.playing_since = Some(now);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn activate(&mut self) {
        self.activated = true;
    }

    fn current_time(&self, now: Instant) -> f64 {
        self.position_at(now)
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    fn is_paused(&self) -> bool {
        self.playing_since.is_none()
    }
}

/// Placeholder element for still images: never plays.
#[derive(Debug, Clone, Copy, Default)]
pub struct StillImage;

impl MediaElement for StillImage {
    fn play(&mut self, _now: Instant) -> Result<(), PlaybackError> {
        Err(PlaybackError::NotPlayable)
    }
    fn pause(&mut self, _now: Instant) {}
    fn seek(&mut self, _seconds: f64, _now: Instant) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn set_muted(&mut self, _muted: bool) {}
    fn current_time(&self, _now: Instant) -> f64 {
        0.0
    }
    fn duration(&self) -> Option<f64> {
        None
    }
    fn is_paused(&self) -> bool {
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Call-recording media double for state-machine tests.

    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub enum MediaCall {
        Play,
        Pause,
        Seek(f64),
        Volume(f32),
        Muted(bool),
    }

    /// Records every call. Shares its log through `calls()` so the test can
    /// inspect it after the element is boxed into a card.
    #[derive(Debug, Clone)]
    pub struct RecordingMedia {
        calls: Arc<Mutex<Vec<MediaCall>>>,
        pub reject_play: bool,
        time: f64,
        duration: Option<f64>,
        paused: bool,
    }

    impl RecordingMedia {
        pub fn new(duration: Option<f64>) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                reject_play: false,
                time: 0.0,
                duration,
                paused: true,
            }
        }

        pub fn log(&self) -> Arc<Mutex<Vec<MediaCall>>> {
            Arc::clone(&self.calls)
        }

        fn push(&self, call: MediaCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl MediaElement for RecordingMedia {
        fn play(&mut self, _now: Instant) -> Result<(), PlaybackError> {
            self.push(MediaCall::Play);
            if self.reject_play {
                return Err(PlaybackError::AutoplayBlocked);
            }
            self.paused = false;
            Ok(())
        }
        fn pause(&mut self, _now: Instant) {
            self.push(MediaCall::Pause);
            self.paused = true;
        }
        fn seek(&mut self, seconds: f64, _now: Instant) {
            self.push(MediaCall::Seek(seconds));
            self.time = seconds;
        }
        fn set_volume(&mut self, volume: f32) {
            self.push(MediaCall::Volume(volume));
        }
        fn set_muted(&mut self, muted: bool) {
            self.push(MediaCall::Muted(muted));
        }
        fn current_time(&self, _now: Instant) -> f64 {
            self.time
        }
        fn duration(&self) -> Option<f64> {
            self.duration
        }
        fn is_paused(&self) -> bool {
            self.paused
        }
    }
}
