//! Feed item domain types.
//!
//! `VideoItem` is immutable once created. The only local mutation the UI
//! performs (optimistic like counting, follow toggling) goes through the
//! pure reducers in `state::feed`, which produce new values.

use super::identifiers::{AuthorId, CommentId, VideoId};
use std::fmt;
use std::sync::Arc;

/// Where a feed item's media lives.
#[derive(Clone, PartialEq, Eq)]
pub enum MediaRef {
    /// Remote URI (CDN preview or generated-video download link).
    Remote(String),
    /// Inline `data:` URI as returned by image generation.
    DataUri(String),
    /// Bytes captured during this session. Never written to disk.
    InMemory {
        /// MIME type of the recorded clip.
        mime: String,
        /// Recorded bytes.
        bytes: Arc<[u8]>,
    },
}

/// Whether a media reference plays (video) or is shown still (image).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Playable with transport controls.
    Video,
    /// Still image, never played.
    Image,
}

impl MediaRef {
    /// Classify the media for rendering.
    ///
    /// Inline `data:image/...` payloads are images; everything else plays.
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaRef::DataUri(uri) if uri.starts_with("data:image") => MediaKind::Image,
            MediaRef::InMemory { mime, .. } if mime.starts_with("image/") => MediaKind::Image,
            _ => MediaKind::Video,
        }
    }

    /// A short, printable reference used for analysis context and the UI.
    pub fn display_uri(&self) -> String {
        match self {
            MediaRef::Remote(uri) => uri.clone(),
            MediaRef::DataUri(uri) => {
                let head = uri.split(',').next().unwrap_or("data:");
                format!("{head},…")
            }
            MediaRef::InMemory { mime, bytes } => {
                format!("memory:{mime} ({} bytes)", bytes.len())
            }
        }
    }
}

impl fmt::Debug for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRef::Remote(uri) => f.debug_tuple("Remote").field(uri).finish(),
            MediaRef::DataUri(uri) => f
                .debug_tuple("DataUri")
                .field(&format_args!("{} chars", uri.len()))
                .finish(),
            MediaRef::InMemory { mime, bytes } => f
                .debug_struct("InMemory")
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// The account that published a feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Account id.
    pub id: AuthorId,
    /// Handle shown as `@name`.
    pub display_name: String,
    /// Avatar image URI.
    pub avatar_uri: String,
    /// Session-local follow state.
    pub following: bool,
}

impl Author {
    /// Build an author record.
    pub fn new(
        id: AuthorId,
        display_name: impl Into<String>,
        avatar_uri: impl Into<String>,
        following: bool,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            avatar_uri: avatar_uri.into(),
            following,
        }
    }
}

/// Engagement counters shown on the side-action rail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    /// Like count, including the local optimistic like.
    pub likes: u64,
    /// Comment count.
    pub comments: u64,
    /// Share count.
    pub shares: u64,
}

/// One playable (or still) entry in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoItem {
    /// Unique item id.
    pub id: VideoId,
    /// Where the media lives.
    pub media: MediaRef,
    /// Publishing account.
    pub author: Author,
    /// Caption shown under the media.
    pub description: String,
    /// Hashtags without the leading `#`.
    pub tags: Vec<String>,
    /// Like, comment and share counters.
    pub engagement: Engagement,
    /// Audio-track label, e.g. "Original Sound - Night City".
    pub audio_label: String,
}

impl VideoItem {
    /// Video or still image.
    pub fn kind(&self) -> MediaKind {
        self.media.kind()
    }
}

/// A comment in the comments sheet. Static sample data only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment id.
    pub id: CommentId,
    /// Display name of the commenter.
    pub author_name: String,
    /// Comment body.
    pub text: String,
    /// Like count.
    pub likes: u64,
    /// Relative timestamp as displayed ("2h", "1d").
    pub posted_ago: String,
}

/// Format a counter the way the side rail shows it: 12400 → "12.4K".
pub fn compact_count(n: u64) -> String {
    match n {
        0..=999 => n.to_string(),
        1_000..=999_999 => format_scaled(n as f64 / 1_000.0, "K"),
        _ => format_scaled(n as f64 / 1_000_000.0, "M"),
    }
}

fn format_scaled(value: f64, suffix: &str) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}{suffix}", rounded as u64)
    } else {
        format!("{rounded:.1}{suffix}")
    }
}
