//! Click routing: regions recorded while rendering, resolved on mouse down.
//!
//! Later regions sit on top of earlier ones, so widgets drawn last (modals,
//! sheets) win. Card media regions resolve to card-relative cells; the
//! scrubber and the volume slider resolve to a fraction of their width.

use crate::state::TapTarget;
use ratatui::layout::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Region {
    Fixed(TapTarget),
    /// Media surface; the tap carries the cell relative to the card origin.
    CardMedia { card: Rect },
    Scrubber,
    VolumeSlider,
}

/// Position of `column` along a one-row slider, in `[0, 1]`.
fn fraction(area: Rect, column: u16) -> f64 {
    let span = area.width.saturating_sub(1).max(1) as f64;
    (column.saturating_sub(area.x) as f64 / span).clamp(0.0, 1.0)
}

/// Clickable regions of the last rendered frame.
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    regions: Vec<(Rect, Region)>,
}

impl HitMap {
    /// Forget every region; called before each frame is drawn.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Register `area` as resolving to `target`. Empty areas are skipped.
    pub fn push(&mut self, area: Rect, target: TapTarget) {
        if area.area() > 0 {
            self.regions.push((area, Region::Fixed(target)));
        }
    }

    /// Media surface of a card whose full area is `card`.
    pub fn push_media(&mut self, area: Rect, card: Rect) {
        if area.area() > 0 {
            self.regions.push((area, Region::CardMedia { card }));
        }
    }

    /// Seek bar; resolves to the clicked fraction of the duration.
    pub fn push_scrubber(&mut self, area: Rect) {
        if area.width > 0 {
            self.regions.push((area, Region::Scrubber));
        }
    }

    /// Volume bar; resolves to the clicked volume in `[0, 1]`.
    pub fn push_volume_slider(&mut self, area: Rect) {
        if area.width > 0 {
            self.regions.push((area, Region::VolumeSlider));
        }
    }

    /// Topmost target under `(column, row)`.
    pub fn resolve(&self, column: u16, row: u16) -> Option<TapTarget> {
        let pos = Position::new(column, row);
        let (area, region) = self.regions.iter().rev().find(|(area, _)| area.contains(pos))?;
        Some(match *region {
            Region::Fixed(target) => target,
            Region::CardMedia { card } => TapTarget::CardMedia {
                x: column.saturating_sub(card.x),
                y: row.saturating_sub(card.y),
            },
            Region::Scrubber => TapTarget::Scrubber {
                fraction: fraction(*area, column),
            },
            Region::VolumeSlider => TapTarget::VolumeSlider {
                fraction: fraction(*area, column),
            },
        })
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether nothing has been registered since the last clear.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
