//! Transport controls: play/pause, scrubber and volume.
//!
//! `PlaybackState` mirrors what the UI shows. Every mutation is applied to the
//! media element and reflected in the state immediately, without waiting for
//! the element to report back.

use crate::media::MediaElement;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default inactivity delay before transport controls hide.
pub const DEFAULT_CONTROLS_HIDE: Duration = Duration::from_millis(3000);

/// Volume restored when unmuting from a zero-volume mute.
pub const UNMUTE_DEFAULT_VOLUME: f32 = 0.5;

/// Volume slider step.
pub const VOLUME_STEP: f32 = 0.05;

/// Per-card playback state as displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Intended play state. May diverge from the element if `play()` was refused.
    pub playing: bool,
    /// Position in seconds.
    pub current_time: f64,
    /// Zero until metadata arrives.
    pub duration: f64,
    /// Level in `0.0..=1.0`.
    pub volume: f32,
    /// Sound off regardless of `volume`.
    pub muted: bool,
    /// Whether the transport bar is drawn.
    pub controls_visible: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        // Feed items start muted so autoplay is permitted.
        Self {
            playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: true,
            controls_visible: false,
        }
    }
}

impl PlaybackState {
    /// Start playback. A refused `play()` is swallowed; `playing` still flips.
    pub fn resume(&mut self, media: &mut dyn MediaElement, now: Instant) {
        if let Err(err) = media.play(now) {
            debug!(error = %err, "play() refused, keeping intended state");
        }
        self.playing = true;
    }

    /// Pause the element.
    pub fn suspend(&mut self, media: &mut dyn MediaElement, now: Instant) {
        media.pause(now);
        self.playing = false;
    }

    /// Play if paused, pause if playing.
    pub fn toggle(&mut self, media: &mut dyn MediaElement, now: Instant) {
        if self.playing {
            self.suspend(media, now);
        } else {
            self.resume(media, now);
        }
    }

    /// Seek to `seconds` (clamped to `[0, duration]` once duration is known) and
    /// show the new time at once. Returns the applied time.
    pub fn seek(&mut self, media: &mut dyn MediaElement, seconds: f64, now: Instant) -> f64 {
        let upper = if self.duration > 0.0 {
            self.duration
        } else {
            f64::MAX
        };
        let target = if seconds.is_finite() {
            seconds.clamp(0.0, upper)
        } else {
            0.0
        };
        media.seek(target, now);
        self.current_time = target;
        target
    }

    /// Seek relative to the displayed time.
    pub fn seek_by(&mut self, media: &mut dyn MediaElement, delta: f64, now: Instant) -> f64 {
        let target = self.current_time + delta;
        self.seek(media, target, now)
    }

    /// Set the slider volume. Zero implies muted; any other value unmutes.
    pub fn set_volume(&mut self, media: &mut dyn MediaElement, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.volume = volume;
        self.muted = volume == 0.0;
        media.set_volume(volume);
        media.set_muted(self.muted);
    }

    /// Nudge the slider by `steps` × `VOLUME_STEP`, starting from what it shows.
    pub fn step_volume(&mut self, media: &mut dyn MediaElement, steps: i32) {
        let base = self.display_volume();
        let next = ((base + steps as f32 * VOLUME_STEP) * 100.0).round() / 100.0;
        self.set_volume(media, next);
    }

    /// Toggle mute. Unmuting while volume is zero restores `UNMUTE_DEFAULT_VOLUME`.
    pub fn toggle_mute(&mut self, media: &mut dyn MediaElement) {
        self.muted = !self.muted;
        media.set_muted(self.muted);
        if !self.muted && self.volume == 0.0 {
            self.volume = UNMUTE_DEFAULT_VOLUME;
            media.set_volume(UNMUTE_DEFAULT_VOLUME);
        }
    }

    /// Element reported a new playback position.
    pub fn on_time_update(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    /// Element reported its duration.
    pub fn on_loaded_metadata(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
    }

    /// The value the volume slider shows: zero while muted.
    pub fn display_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Scrubber fill ratio in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Format seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::{MediaCall, RecordingMedia};

    #[test]
    fn resume_flips_state_even_when_play_is_refused() {
        let mut media = RecordingMedia::new(Some(10.0));
        media.reject_play = true;
        let mut s = PlaybackState::default();
        s.resume(&mut media, Instant::now());
        assert!(s.playing);
        assert!(media.is_paused(), "element itself stayed paused");
    }

    #[test]
    fn toggle_alternates() {
        let mut media = RecordingMedia::new(Some(10.0));
        let log = media.log();
        let mut s = PlaybackState::default();
        let now = Instant::now();
        s.toggle(&mut media, now);
        s.toggle(&mut media, now);
        assert!(!s.playing);
        assert_eq!(*log.lock().unwrap(), vec![MediaCall::Play, MediaCall::Pause]);
    }

    #[test]
    fn seek_reflects_immediately() {
        let mut media = RecordingMedia::new(Some(10.0));
        let mut s = PlaybackState::default();
        s.on_loaded_metadata(10.0);
        let applied = s.seek(&mut media, 4.5, Instant::now());
        assert_eq!(applied, 4.5);
        assert_eq!(s.current_time, 4.5);
    }

    #[test]
    fn seek_clamps_to_known_duration() {
        let mut media = RecordingMedia::new(Some(10.0));
        let mut s = PlaybackState::default();
        s.on_loaded_metadata(10.0);
        assert_eq!(s.seek(&mut media, 99.0, Instant::now()), 10.0);
        assert_eq!(s.seek_by(&mut media, -50.0, Instant::now()), 0.0);
    }

    #[test]
    fn zero_volume_implies_muted() {
        let mut media = RecordingMedia::new(None);
        let mut s = PlaybackState::default();
        s.set_volume(&mut media, 0.7);
        assert!(!s.muted);
        s.set_volume(&mut media, 0.0);
        assert!(s.muted);
    }

    #[test]
    fn unmute_from_zero_volume_restores_half() {
        let mut media = RecordingMedia::new(None);
        let mut s = PlaybackState::default();
        s.set_volume(&mut media, 0.0);
        s.toggle_mute(&mut media);
        assert!(!s.muted);
        assert_eq!(s.volume, UNMUTE_DEFAULT_VOLUME);
    }

    #[test]
    fn unmute_with_nonzero_volume_keeps_it() {
        let mut media = RecordingMedia::new(None);
        let mut s = PlaybackState::default();
        assert!(s.muted);
        s.toggle_mute(&mut media);
        assert_eq!(s.volume, 1.0);
    }

    #[test]
    fn step_volume_starts_from_displayed_value() {
        let mut media = RecordingMedia::new(None);
        let mut s = PlaybackState::default();
        // Muted at start: display shows 0, one step up gives 0.05.
        s.step_volume(&mut media, 1);
        assert!(!s.muted);
        assert!((s.volume - 0.05).abs() < 1e-6);
        s.step_volume(&mut media, -1);
        assert!(s.muted);
    }

    #[test]
    fn metadata_ignores_nonsense_duration() {
        let mut s = PlaybackState::default();
        s.on_loaded_metadata(f64::NAN);
        assert_eq!(s.duration, 0.0);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn format_time_pads_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(7.9), "0:07");
        assert_eq!(format_time(125.0), "2:05");
    }
}
