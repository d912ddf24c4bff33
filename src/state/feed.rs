//! Feed list reducers and the snap-scrolling feed viewport.
//!
//! The feed itself is an immutable `Vec<VideoItem>`; the reducers below return
//! a new list. `FeedView` owns one mounted `FeedCard` per displayed item and
//! recomputes each card's visibility ratio after every scroll change.

use super::feed_card::{CardConfig, FeedCard};
use super::scheduler::Scheduler;
use crate::media::MediaElement;
use crate::model::{AuthorId, VideoId, VideoItem};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Idle time after wheel scrolling before the feed snaps to the nearest card.
pub const SNAP_DELAY: Duration = Duration::from_millis(150);

// ===== Reducers =====

/// New item at the top of the feed.
pub fn with_created(items: &[VideoItem], item: VideoItem) -> Vec<VideoItem> {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.push(item);
    next.extend(items.iter().cloned());
    next
}

/// Optimistic like counter: +1 when liked, -1 when unliked.
pub fn with_like(items: &[VideoItem], id: &VideoId, liked: bool) -> Vec<VideoItem> {
    items
        .iter()
        .map(|item| {
            if &item.id != id {
                return item.clone();
            }
            let mut next = item.clone();
            next.engagement.likes = if liked {
                next.engagement.likes.saturating_add(1)
            } else {
                next.engagement.likes.saturating_sub(1)
            };
            next
        })
        .collect()
}

/// Flip the follow state of every item by `author`.
pub fn with_follow_toggled(items: &[VideoItem], author: &AuthorId) -> Vec<VideoItem> {
    let following = items
        .iter()
        .find(|item| &item.author.id == author)
        .map(|item| !item.author.following);
    let Some(following) = following else {
        return items.to_vec();
    };
    items
        .iter()
        .map(|item| {
            let mut next = item.clone();
            if &next.author.id == author {
                next.author.following = following;
            }
            next
        })
        .collect()
}

/// Home feed filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedTab {
    /// Followed authors only.
    Following,
    /// Everything.
    #[default]
    ForYou,
}

impl FeedTab {
    /// The other tab.
    pub fn toggled(self) -> Self {
        match self {
            FeedTab::Following => FeedTab::ForYou,
            FeedTab::ForYou => FeedTab::Following,
        }
    }

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            FeedTab::Following => "Following",
            FeedTab::ForYou => "For You",
        }
    }

    /// Whether `item` belongs on this tab.
    pub fn includes(self, item: &VideoItem) -> bool {
        match self {
            FeedTab::ForYou => true,
            FeedTab::Following => item.author.following,
        }
    }
}

/// Creates the media element for a newly mounted card.
pub type MediaFactory = dyn Fn(&VideoItem) -> Box<dyn MediaElement>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ViewTimer {
    Snap,
}

// ===== FeedView =====

/// Vertical snap-scroll list of mounted cards.
#[derive(Debug)]
pub struct FeedView {
    cards: Vec<FeedCard>,
    offset_rows: u32,
    card_height: u16,
    config: CardConfig,
    timers: Scheduler<ViewTimer>,
}

impl FeedView {
    /// Empty feed.
    pub fn new(config: CardConfig) -> Self {
        Self {
            cards: Vec::new(),
            offset_rows: 0,
            card_height: 1,
            config,
            timers: Scheduler::new(),
        }
    }

    /// Reconcile mounted cards with `items`, keyed by item id. Surviving cards keep
    /// their state; removed cards are torn down; new ones are mounted.
    pub fn sync(&mut self, items: &[&VideoItem], factory: &MediaFactory, now: Instant) {
        let current_id = self.current_card().map(|c| c.item_id().clone());

        let mut existing: HashMap<VideoId, FeedCard> = self
            .cards
            .drain(..)
            .map(|card| (card.item_id().clone(), card))
            .collect();

        let config = self.config;
        self.cards = items
            .iter()
            .map(|item| {
                existing
                    .remove(&item.id)
                    .unwrap_or_else(|| FeedCard::mount(item, factory(item), config))
            })
            .collect();

        for (id, mut card) in existing {
            debug!(item = %id, "unmounting feed card");
            card.teardown(now);
        }

        // Keep the viewer on the same item when it survives.
        let index = current_id
            .and_then(|id| self.cards.iter().position(|c| c.item_id() == &id))
            .unwrap_or(0);
        self.snap_to(index, now);
    }

    /// Resize cards, keeping the current one in place.
    pub fn set_card_height(&mut self, height: u16, now: Instant) {
        let height = height.max(1);
        if height == self.card_height {
            return;
        }
        let index = self.current_index();
        self.card_height = height;
        self.snap_to(index, now);
    }

    /// Rows per card.
    pub fn card_height(&self) -> u16 {
        self.card_height
    }

    /// Scroll offset from the top of the first card.
    pub fn offset_rows(&self) -> u32 {
        self.offset_rows
    }

    fn max_offset(&self) -> u32 {
        (self.cards.len().saturating_sub(1) as u32) * self.card_height as u32
    }

    /// Index of the card nearest to the viewport top.
    pub fn current_index(&self) -> usize {
        let h = self.card_height as u32;
        ((self.offset_rows + h / 2) / h) as usize
    }

    /// Scroll so card `index` fills the viewport.
    pub fn snap_to(&mut self, index: usize, now: Instant) {
        let index = index.min(self.cards.len().saturating_sub(1));
        self.offset_rows = index as u32 * self.card_height as u32;
        self.timers.cancel(ViewTimer::Snap);
        self.observe_all(now);
    }

    /// Snap to the next card.
    pub fn next(&mut self, now: Instant) {
        let index = self.current_index() + 1;
        self.snap_to(index, now);
    }

    /// Snap to the previous card.
    pub fn prev(&mut self, now: Instant) {
        let index = self.current_index().saturating_sub(1);
        self.snap_to(index, now);
    }

    /// Free scroll by `delta` rows (mouse wheel); snaps after `SNAP_DELAY` idle.
    pub fn scroll_rows(&mut self, delta: i32, now: Instant) {
        let next = (self.offset_rows as i64 + delta as i64).clamp(0, self.max_offset() as i64);
        self.offset_rows = next as u32;
        self.timers.schedule(ViewTimer::Snap, now, SNAP_DELAY);
        self.observe_all(now);
    }

    /// Fraction of card `index` inside the viewport.
    pub fn visibility_ratio(&self, index: usize) -> f32 {
        let h = self.card_height as u32;
        let top = index as u32 * h;
        let bottom = top + h;
        let view_top = self.offset_rows;
        let view_bottom = view_top + h;
        let overlap = bottom.min(view_bottom).saturating_sub(top.max(view_top));
        overlap as f32 / h as f32
    }

    fn observe_all(&mut self, now: Instant) {
        let ratios: Vec<f32> = (0..self.cards.len())
            .map(|i| self.visibility_ratio(i))
            .collect();
        for (card, ratio) in self.cards.iter_mut().zip(ratios) {
            card.observe_visibility(ratio, now);
        }
    }

    /// Fire the snap timer and every card's timers.
    pub fn tick(&mut self, now: Instant) {
        if !self.timers.take_due(now).is_empty() {
            let index = self.current_index();
            self.snap_to(index, now);
        }
        for card in &mut self.cards {
            card.tick(now);
        }
    }

    /// Earliest deadline across the view and its cards.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.cards
            .iter()
            .filter_map(FeedCard::next_deadline)
            .chain(self.timers.next_deadline())
            .min()
    }

    /// Mounted cards in feed order.
    pub fn cards(&self) -> &[FeedCard] {
        &self.cards
    }

    /// Card for `id`, if mounted.
    pub fn card_mut(&mut self, id: &VideoId) -> Option<&mut FeedCard> {
        self.cards.iter_mut().find(|c| c.item_id() == id)
    }

    /// Card nearest the viewport top.
    pub fn current_card(&self) -> Option<&FeedCard> {
        self.cards.get(self.current_index())
    }

    /// Mutable card nearest the viewport top.
    pub fn current_card_mut(&mut self) -> Option<&mut FeedCard> {
        let index = self.current_index();
        self.cards.get_mut(index)
    }

    /// Whether no cards are mounted.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Tear down every card (screen switch away from Home or shutdown).
    pub fn unmount_all(&mut self, now: Instant) {
        for card in &mut self.cards {
            card.teardown(now);
        }
        self.cards.clear();
        self.offset_rows = 0;
        self.timers.clear();
    }
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
