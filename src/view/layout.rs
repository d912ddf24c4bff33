//! Frame layout: top bar, screen content, bottom navigation and the modal
//! layers drawn above them.
//!
//! Rendering is pure with respect to `AppState`; click regions are recorded
//! into the `HitMap` in draw order so later layers win.

use super::create_modal::render_create_modal;
use super::feed_pane::render_feed;
use super::help::{centered_rect, render_help_overlay};
use super::hit_map::HitMap;
use super::screens;
use super::styles;
use super::text::truncate;
use crate::state::{AppState, FeedTab, NavTab, Screen, TapTarget};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// The three fixed bands of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAreas {
    /// Brand, feed tabs and search button.
    pub top_bar: Rect,
    /// Active screen.
    pub content: Rect,
    /// Bottom navigation.
    pub nav_bar: Rect,
}

/// Split the frame into top bar, content and bottom navigation.
pub fn frame_areas(area: Rect) -> FrameAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Top bar
            Constraint::Min(0),    // Screen content
            Constraint::Length(1), // Navigation
        ])
        .split(area);
    FrameAreas {
        top_bar: chunks[0],
        content: chunks[1],
        nav_bar: chunks[2],
    }
}

/// Render a full frame, recording click regions into `hits`.
pub fn render_layout(frame: &mut Frame, state: &AppState, hits: &mut HitMap) {
    hits.clear();
    let area = frame.area();

    if state.screen == Screen::Splash {
        screens::render_splash(frame, area);
        hits.push(area, TapTarget::Back);
        return;
    }

    let areas = frame_areas(area);
    render_top_bar(frame, areas.top_bar, state, hits);
    match state.screen {
        Screen::Home => render_feed(frame, areas.content, state, hits),
        Screen::Friends => screens::render_friends(frame, areas.content),
        Screen::Inbox => screens::render_inbox(frame, areas.content),
        Screen::Profile => screens::render_profile(frame, areas.content, state),
        Screen::Settings => screens::render_settings(frame, areas.content, state, hits),
        Screen::Search => screens::render_search(frame, areas.content, state, hits),
        Screen::Splash => {}
    }
    render_nav_bar(frame, areas.nav_bar, state, hits);

    if let Some(flow) = state.create() {
        render_create_modal(frame, area, flow, hits);
    }
    if let Some(notice) = state.notice() {
        render_notice(frame, areas, notice);
    }
    if state.help_visible {
        render_help_overlay(frame);
        hits.push(area, TapTarget::SheetBody);
    }
    if let Some(input) = state.credential_input() {
        render_credential_prompt(frame, area, input, hits);
    }
}

fn render_top_bar(frame: &mut Frame, area: Rect, state: &AppState, hits: &mut HitMap) {
    if area.height == 0 {
        return;
    }
    match state.screen {
        Screen::Home => {
            let mut x = area.x + 1;
            for tab in [FeedTab::Following, FeedTab::ForYou] {
                let label = format!(" {} ", tab.label());
                let width = label.width() as u16;
                if x + width > area.x + area.width {
                    break;
                }
                let style = if tab == state.feed_tab {
                    styles::SELECTED
                } else {
                    styles::MUTED_TEXT
                };
                let rect = Rect::new(x, area.y, width, 1);
                frame.render_widget(Paragraph::new(Span::styled(label, style)), rect);
                hits.push(rect, TapTarget::FeedTab(tab));
                x += width + 1;
            }
            let search = "[/ Search]";
            let width = search.width() as u16;
            if area.width >= width && x + width <= area.x + area.width {
                let rect = Rect::new(area.x + area.width - width, area.y, width, 1);
                frame.render_widget(Paragraph::new(Span::styled(search, styles::KEY_HINT)), rect);
                hits.push(rect, TapTarget::OpenSearch);
            }
        }
        Screen::Settings | Screen::Search => {
            let back = "‹ Back";
            let width = (back.width() as u16).min(area.width);
            let rect = Rect::new(area.x, area.y, width, 1);
            frame.render_widget(Paragraph::new(Span::styled(back, styles::KEY_HINT)), rect);
            hits.push(rect, TapTarget::Back);
            let title = if state.screen == Screen::Settings {
                "Settings and privacy"
            } else {
                "Discover"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(title, styles::TITLE)).alignment(Alignment::Center),
                area,
            );
        }
        screen => {
            let title = match screen {
                Screen::Friends => "Friends",
                Screen::Inbox => "Inbox",
                Screen::Profile => "Profile",
                _ => "",
            };
            frame.render_widget(
                Paragraph::new(Span::styled(title, styles::TITLE)).alignment(Alignment::Center),
                area,
            );
        }
    }
}

fn render_nav_bar(frame: &mut Frame, area: Rect, state: &AppState, hits: &mut HitMap) {
    let active = state.screen.nav_tab();
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);
    for (tab, slot) in NavTab::ALL.into_iter().zip(slots.iter()) {
        let style = if tab == NavTab::Create {
            styles::LIKED
        } else if Some(tab) == active {
            styles::TITLE
        } else {
            styles::MUTED_TEXT
        };
        let label = if tab == NavTab::Create {
            " + ".to_string()
        } else {
            tab.label().to_string()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, style)).alignment(Alignment::Center),
            *slot,
        );
        hits.push(*slot, TapTarget::Nav(tab));
    }
}

fn render_notice(frame: &mut Frame, areas: FrameAreas, notice: &str) {
    let content = areas.content;
    if content.height == 0 {
        return;
    }
    let text = truncate(notice, content.width.saturating_sub(4) as usize);
    let width = (text.width() as u16 + 2).min(content.width);
    let rect = Rect::new(
        content.x + (content.width - width) / 2,
        content.y + content.height - 1,
        width,
        1,
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {text} "), styles::SELECTED)),
        rect,
    );
}

fn render_credential_prompt(frame: &mut Frame, area: Rect, input: &str, hits: &mut HitMap) {
    let popup = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup);
    hits.push(area, TapTarget::SheetBody);

    let masked = "•".repeat(input.chars().count());
    let lines = vec![
        Line::from(Span::styled(
            "Generation needs a Gemini API key from a billed project.",
            Style::default(),
        )),
        Line::from(Span::styled(
            "The key is kept in memory for this session only.",
            styles::MUTED_TEXT,
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("Key: ", styles::KEY_HINT),
            Span::raw(masked),
            Span::styled("▏", styles::AI_TEXT),
        ]),
        Line::default(),
        Line::from(Span::styled("Enter save · Esc cancel", styles::MUTED_TEXT)),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::AI_TEXT)
        .title(Span::styled(" API key ", styles::AI_TEXT));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(ratatui::widgets::Wrap { trim: true }),
        popup,
    );
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
