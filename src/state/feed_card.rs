//! One feed card: visibility monitor, gesture interpreter, transport controls
//! and overlay stack bound to a single media element.
//!
//! Created when the card is mounted and torn down when it leaves the feed.
//! All timers (control auto-hide, heart bursts) live in the card's own
//! scheduler and are cleared on teardown.

use super::gesture::{BurstId, GestureInterpreter, HeartBursts, TapOutcome, TapRegion};
use super::overlay::{AnalysisRequest, Overlay, Sheet};
use super::scheduler::Scheduler;
use super::transport::PlaybackState;
use super::visibility::{VisibilityChange, VisibilityMonitor};
use crate::media::MediaElement;
use crate::model::{MediaKind, VideoId, VideoItem};
use std::time::{Duration, Instant};
use tracing::trace;

/// Tunables shared by every card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardConfig {
    /// Second tap inside this window is a double-tap.
    pub gesture_window: Duration,
    /// Lifetime of one heart burst.
    pub heart_burst: Duration,
    /// Idle time before transport controls hide.
    pub controls_hide: Duration,
    /// On-screen ratio at which playback starts.
    pub visibility_threshold: f32,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            gesture_window: super::gesture::DEFAULT_GESTURE_WINDOW,
            heart_burst: super::gesture::DEFAULT_HEART_BURST,
            controls_hide: super::transport::DEFAULT_CONTROLS_HIDE,
            visibility_threshold: super::visibility::DEFAULT_VISIBILITY_THRESHOLD,
        }
    }
}

/// Timers owned by a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardTimer {
    /// Transport controls auto-hide.
    HideControls,
    /// Expiry of one heart burst.
    Burst(BurstId),
}

/// Something the feed needs to know about after a card interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    /// Nothing outside the card changed.
    None,
    /// The liked flag changed; the feed applies the optimistic counter.
    LikeChanged(bool),
}

/// One mounted feed item with its media element and UI state.
pub struct FeedCard {
    item_id: VideoId,
    kind: MediaKind,
    /// Transport state as displayed.
    pub playback: PlaybackState,
    /// Drawer or sheet over the media.
    pub overlay: Overlay,
    /// Local like flag.
    pub liked: bool,
    /// Live heart animations.
    pub bursts: HeartBursts,
    monitor: VisibilityMonitor,
    gestures: GestureInterpreter,
    timers: Scheduler<CardTimer>,
    media: Box<dyn MediaElement>,
    config: CardConfig,
}

impl std::fmt::Debug for FeedCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedCard")
            .field("item_id", &self.item_id)
            .field("kind", &self.kind)
            .field("playback", &self.playback)
            .field("overlay", &self.overlay)
            .field("liked", &self.liked)
            .finish_non_exhaustive()
    }
}

impl FeedCard {
    /// Mount a card for `item`, pushing the initial mute/volume to the element.
    pub fn mount(item: &VideoItem, mut media: Box<dyn MediaElement>, config: CardConfig) -> Self {
        let playback = PlaybackState::default();
        media.set_muted(playback.muted);
        media.set_volume(playback.volume);

        let mut card = Self {
            item_id: item.id.clone(),
            kind: item.kind(),
            playback,
            overlay: Overlay::default(),
            liked: false,
            bursts: HeartBursts::default(),
            monitor: VisibilityMonitor::new(config.visibility_threshold),
            gestures: GestureInterpreter::new(config.gesture_window),
            timers: Scheduler::new(),
            media,
            config,
        };
        if let Some(duration) = card.media.duration() {
            card.playback.on_loaded_metadata(duration);
        }
        card
    }

    /// Item this card renders.
    pub fn item_id(&self) -> &VideoId {
        &self.item_id
    }

    /// Video or image.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Only videos have transport controls.
    pub fn is_playable(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Feed the card's current on-screen ratio. Returns the crossing, if any.
    pub fn observe_visibility(&mut self, ratio: f32, now: Instant) -> Option<VisibilityChange> {
        let change = self.monitor.observe(ratio)?;
        if self.is_playable() {
            match change {
                VisibilityChange::Resume => self.playback.resume(self.media.as_mut(), now),
                VisibilityChange::Suspend => self.playback.suspend(self.media.as_mut(), now),
            }
        }
        trace!(item = %self.item_id, ?change, "visibility crossing");
        Some(change)
    }

    /// Whether the card is past the visibility threshold.
    pub fn is_visible(&self) -> bool {
        self.monitor.is_visible()
    }

    /// Handle a tap at card-relative `(x, y)` in `region`.
    pub fn tap(&mut self, now: Instant, x: u16, y: u16, region: TapRegion) -> CardEvent {
        self.media.activate();
        match self.gestures.interpret(now, x, y, region) {
            TapOutcome::DoubleTap(burst) => {
                self.bursts.spawn(burst);
                self.timers
                    .schedule(CardTimer::Burst(burst.id), now, self.config.heart_burst);
                if self.liked {
                    CardEvent::None
                } else {
                    self.liked = true;
                    CardEvent::LikeChanged(true)
                }
            }
            TapOutcome::TogglePlayback => {
                self.toggle_play(now);
                CardEvent::None
            }
            TapOutcome::Ignored => CardEvent::None,
        }
    }

    /// Play button / keyboard toggle. Bypasses gesture classification.
    pub fn toggle_play(&mut self, now: Instant) {
        self.media.activate();
        if self.is_playable() {
            self.playback.toggle(self.media.as_mut(), now);
        }
        self.touch_controls(now);
    }

    /// Like button on the side rail.
    pub fn toggle_like(&mut self) -> CardEvent {
        self.liked = !self.liked;
        CardEvent::LikeChanged(self.liked)
    }

    /// Show controls and restart the auto-hide timer.
    pub fn touch_controls(&mut self, now: Instant) {
        self.playback.controls_visible = true;
        self.timers
            .schedule(CardTimer::HideControls, now, self.config.controls_hide);
    }

    /// Jump to `seconds`, clamped to the duration.
    pub fn seek(&mut self, seconds: f64, now: Instant) {
        self.playback.seek(self.media.as_mut(), seconds, now);
        self.touch_controls(now);
    }

    /// Relative seek.
    pub fn seek_by(&mut self, delta: f64, now: Instant) {
        self.playback.seek_by(self.media.as_mut(), delta, now);
        self.touch_controls(now);
    }

    /// Set volume; zero mutes.
    pub fn set_volume(&mut self, volume: f32, now: Instant) {
        self.media.activate();
        self.playback.set_volume(self.media.as_mut(), volume);
        self.touch_controls(now);
    }

    /// Nudge volume by `steps` increments.
    pub fn step_volume(&mut self, steps: i32, now: Instant) {
        self.media.activate();
        self.playback.step_volume(self.media.as_mut(), steps);
        self.touch_controls(now);
    }

    /// Flip mute, keeping the volume level.
    pub fn toggle_mute(&mut self, now: Instant) {
        self.media.activate();
        self.playback.toggle_mute(self.media.as_mut());
        self.touch_controls(now);
    }

    /// Open the analysis picker, or close whatever analysis state is showing.
    pub fn toggle_analysis(&mut self) {
        self.overlay.toggle_analysis();
    }

    /// Pick an analysis option (0-based). Returns the request to run.
    pub fn select_analysis(&mut self, index: usize) -> Option<AnalysisRequest> {
        self.overlay.select_option(index)
    }

    /// Apply an analysis result if `option_id` is still loading.
    pub fn complete_analysis(&mut self, option_id: &str, outcome: Result<Option<String>, String>) {
        self.overlay.complete_analysis(option_id, outcome);
    }

    /// Open `sheet`, replacing any other overlay.
    pub fn open_sheet(&mut self, sheet: Sheet) {
        self.overlay.open_sheet(sheet);
    }

    /// Close `sheet` if it is the one open.
    pub fn close_sheet(&mut self, sheet: Sheet) {
        self.overlay.close_sheet(sheet);
    }

    /// Advance timers and pull the element's position while playing.
    pub fn tick(&mut self, now: Instant) {
        for timer in self.timers.take_due(now) {
            match timer {
                CardTimer::HideControls => self.playback.controls_visible = false,
                CardTimer::Burst(id) => {
                    self.bursts.expire(id);
                }
            }
        }
        if self.playback.playing && !self.media.is_paused() {
            let t = self.media.current_time(now);
            self.playback.on_time_update(t);
        }
    }

    /// Earliest card timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Unmount: stop observing, cancel timers, pause the element.
    pub fn teardown(&mut self, now: Instant) {
        self.monitor.disconnect();
        self.timers.clear();
        self.bursts.clear();
        self.media.pause(now);
        self.playback.playing = false;
    }
}

#[cfg(test)]
#[path = "feed_card_tests.rs"]
mod tests;
