//! Shared colors and text styles.
//!
//! Colors follow a dark short-video palette: accent pink for likes and the
//! create button, cyan for AI features.

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(254, 44, 85);
pub const AI: Color = Color::Rgb(37, 244, 238);

pub const MUTED_TEXT: Style = Style::new().fg(Color::DarkGray);
pub const SECTION_HEADER: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const KEY_HINT: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
pub const TITLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);
pub const LIKED: Style = Style::new().fg(ACCENT).add_modifier(Modifier::BOLD);
pub const AI_TEXT: Style = Style::new().fg(AI);
pub const ERROR_TEXT: Style = Style::new().fg(Color::Red);
pub const SELECTED: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::White)
    .add_modifier(Modifier::BOLD);
pub const BACKDROP: Style = Style::new().bg(Color::Black).fg(Color::DarkGray);
