//! Visibility-driven autoplay.
//!
//! A `VisibilityMonitor` turns a stream of on-screen intersection ratios into
//! resume/suspend signals, emitting exactly one signal per threshold crossing.

/// Default fraction of the card that must be on screen to play.
pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.6;

/// Signal emitted when the observed ratio crosses the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    /// Ratio rose to or above the threshold.
    Resume,
    /// Ratio fell below the threshold.
    Suspend,
}

/// Observes one card's intersection ratio. Starts hidden (not playing).
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityMonitor {
    threshold: f32,
    visible: bool,
    connected: bool,
}

impl VisibilityMonitor {
    /// Create a connected monitor. The threshold is clamped to `(0, 1]`.
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.clamp(f32::EPSILON, 1.0)
        } else {
            DEFAULT_VISIBILITY_THRESHOLD
        };
        Self {
            threshold,
            visible: false,
            connected: true,
        }
    }

    /// Feed a new ratio. Returns a change only when the ratio crosses the threshold.
    ///
    /// A disconnected monitor never signals.
    pub fn observe(&mut self, ratio: f32) -> Option<VisibilityChange> {
        if !self.connected {
            return None;
        }
        let now_visible = ratio >= self.threshold;
        if now_visible == self.visible {
            return None;
        }
        self.visible = now_visible;
        Some(if now_visible {
            VisibilityChange::Resume
        } else {
            VisibilityChange::Suspend
        })
    }

    /// Stop observing. Further ratios are ignored.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Whether ratios are still observed.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Last reported visibility.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Ratio that flips visibility.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for VisibilityMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY_THRESHOLD)
    }
}
