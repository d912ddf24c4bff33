//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use std::fmt;

/// Unique identifier for a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Smart constructor: validates non-empty video ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidVideoId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidVideoId::Empty);
        }
        Ok(Self(raw))
    }

    /// Identifier derived from a creation timestamp (milliseconds since epoch).
    pub fn from_timestamp(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author (account) identifier, e.g. "u1" or "ai_creator".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorId(String);

impl AuthorId {
    /// Smart constructor: validates non-empty author ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidAuthorId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidAuthorId::Empty);
        }
        Ok(Self(raw))
    }

    /// Built-in account ids known to be non-empty.
    pub(crate) fn from_static(raw: &'static str) -> Self {
        debug_assert!(!raw.is_empty());
        Self(raw.to_string())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentId(String);

impl CommentId {
    /// Smart constructor: validates non-empty comment ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidCommentId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidCommentId::Empty);
        }
        Ok(Self(raw))
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

/// Rejected video id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidVideoId {
    /// The id was empty.
    #[error("Video ID cannot be empty")]
    Empty,
}

/// Rejected author id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAuthorId {
    /// The id was empty.
    #[error("Author ID cannot be empty")]
    Empty,
}

/// Rejected comment id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCommentId {
    /// The id was empty.
    #[error("Comment ID cannot be empty")]
    Empty,
}

// ===== Tests =====
