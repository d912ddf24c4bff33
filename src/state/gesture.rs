//! Tap gesture interpretation.
//!
//! Pure functions and a small state holder that classify taps on the media
//! surface as single (toggle playback) or double (like + heart burst).

use std::time::{Duration, Instant};

/// Default maximum gap between two taps of a double-tap.
pub const DEFAULT_GESTURE_WINDOW: Duration = Duration::from_millis(300);

/// Default lifetime of a heart-burst animation.
pub const DEFAULT_HEART_BURST: Duration = Duration::from_millis(1000);

/// Which part of a feed card a tap landed in, as reported by hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapRegion {
    /// The bare media surface.
    Media,
    /// Transport controls (scrubber, play button, volume).
    Controls,
    /// Side-action rail (like, comments, share, analysis, follow).
    SideActions,
    /// A bottom sheet or the analysis drawer.
    Sheet,
}

impl TapRegion {
    /// Taps inside controls, side actions or sheets are handled by those
    /// elements and never toggle playback.
    pub fn is_excluded(self) -> bool {
        !matches!(self, TapRegion::Media)
    }
}

/// Identifier of one heart-burst animation. Unique per interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BurstId(u64);

impl BurstId {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A transient heart anchored at the tap position (card-relative cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartBurst {
    /// Identifies the burst for expiry.
    pub id: BurstId,
    /// Tap column.
    pub x: u16,
    /// Tap row.
    pub y: u16,
}

/// Result of interpreting a single tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Second tap inside the window: like and spawn a heart. Never toggles playback.
    DoubleTap(HeartBurst),
    /// Lone tap on the media surface.
    TogglePlayback,
    /// Tap in an excluded region; the region's own handler deals with it.
    Ignored,
}

/// Tracks the previous tap to classify the next one.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    window: Duration,
    last_tap: Option<Instant>,
    next_burst: u64,
}

impl GestureInterpreter {
    /// Interpreter with the given double-tap window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_tap: None,
            next_burst: 0,
        }
    }

    /// Classify a tap at card-relative cell `(x, y)`.
    ///
    /// Taps in excluded regions are not recorded, so they cannot pair with a
    /// later media tap into a double-tap.
    pub fn interpret(&mut self, at: Instant, x: u16, y: u16, region: TapRegion) -> TapOutcome {
        if region.is_excluded() {
            return TapOutcome::Ignored;
        }

        let is_double = self
            .last_tap
            .is_some_and(|prev| at.saturating_duration_since(prev) < self.window);
        self.last_tap = Some(at);

        if is_double {
            let id = BurstId(self.next_burst);
            self.next_burst += 1;
            TapOutcome::DoubleTap(HeartBurst { id, x, y })
        } else {
            TapOutcome::TogglePlayback
        }
    }

    /// Double-tap window.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(DEFAULT_GESTURE_WINDOW)
    }
}

/// Live heart-burst animations on one card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeartBursts {
    active: Vec<HeartBurst>,
}

impl HeartBursts {
    /// Add a burst.
    pub fn spawn(&mut self, burst: HeartBurst) {
        self.active.push(burst);
    }

    /// Remove exactly the burst with `id`; other bursts are untouched.
    pub fn expire(&mut self, id: BurstId) -> bool {
        let before = self.active.len();
        self.active.retain(|b| b.id != id);
        before != self.active.len()
    }

    /// Live bursts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HeartBurst> {
        self.active.iter()
    }

    /// Live burst count.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no bursts are live.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop every burst.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
#[path = "gesture_tests.rs"]
mod tests;
