//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod catalog;
pub mod error;
pub mod identifiers;
pub mod key_action;
pub mod video;

// Re-export for convenience
pub use catalog::AnalysisOption;
pub use error::{AppError, CaptureError, FlowError, GenerationError};
pub use identifiers::{
    AuthorId, CommentId, InvalidAuthorId, InvalidCommentId, InvalidVideoId, VideoId,
};
pub use key_action::KeyAction;
pub use video::{compact_count, Author, Comment, Engagement, MediaKind, MediaRef, VideoItem};
