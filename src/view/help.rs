//! Help overlay widget displaying keyboard shortcuts.
//!
//! Shows a centered modal overlay with all keyboard shortcuts grouped by category.
//! Triggered by '?' key, dismissed by 'Esc' or '?'.

use super::styles;
use crate::config::keybindings::HELP_SECTIONS;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Width of the key column.
const KEY_COLUMN: usize = 14;

/// Render the help overlay centered on the screen.
pub fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, popup_area);

    let help = Paragraph::new(build_help_content())
        .block(
            Block::default()
                .title(" Keyboard Shortcuts ")
                .borders(Borders::ALL)
                .border_style(styles::SECTION_HEADER),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);
    frame.render_widget(help, popup_area);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(1),
        width: popup_area.width,
        height: 1.min(popup_area.height),
    };
    let hint = Paragraph::new(Line::from(Span::styled(
        " Press Esc or ? to close ",
        styles::MUTED_TEXT.add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hint, hint_area);
}

/// Rect covering `percent_x` by `percent_y` of `area`, centered.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_width = area.width * percent_x / 100;
    let popup_height = area.height * percent_y / 100;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect {
        x: area.x + popup_x,
        y: area.y + popup_y,
        width: popup_width,
        height: popup_height,
    }
}

fn build_help_content() -> Vec<Line<'static>> {
    let desc_style = Style::default();
    let mut lines = Vec::new();
    for (index, (section, bindings)) in HELP_SECTIONS.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(*section, styles::SECTION_HEADER)));
        for (keys, description) in bindings.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<KEY_COLUMN$}"), styles::KEY_HINT),
                Span::styled(*description, desc_style),
            ]));
        }
    }
    lines
}
