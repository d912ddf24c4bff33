//! Full-screen views other than the feed.

use super::hit_map::HitMap;
use super::styles;
use super::text::{fit, markdown_lines, truncate};
use crate::model::catalog::{
    FRIEND_SUGGESTIONS, INBOX_CATEGORIES, INBOX_MESSAGES, SETTINGS_SECTIONS,
};
use crate::model::compact_count;
use crate::state::search::suggestions;
use crate::state::{AppState, SearchPhase, TapTarget};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render_splash(frame: &mut Frame, area: Rect) {
    let top = area.y + area.height.saturating_sub(4) / 2;
    let logo = Rect::new(area.x, top, area.width, 4.min(area.height));
    let lines = vec![
        Line::from(vec![
            Span::styled("reel", styles::TITLE),
            Span::styled("feed", styles::LIKED),
        ]),
        Line::default(),
        Line::from(Span::styled("Powered by Gemini", styles::AI_TEXT)),
        Line::from(Span::styled("press any key", styles::MUTED_TEXT)),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), logo);
}

pub fn render_friends(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled("Suggested accounts", styles::SECTION_HEADER)),
        Line::default(),
    ];
    for name in FRIEND_SUGGESTIONS {
        lines.push(Line::from(vec![
            Span::styled(fit(&format!("@{name}"), 24), styles::TITLE),
            Span::styled("Follow", styles::LIKED),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

pub fn render_inbox(frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for category in INBOX_CATEGORIES {
        lines.push(Line::from(vec![
            Span::styled("› ", styles::MUTED_TEXT),
            Span::raw(category),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Activity", styles::SECTION_HEADER)));
    for message in INBOX_MESSAGES {
        let from_style = if message.system {
            styles::AI_TEXT.add_modifier(Modifier::BOLD)
        } else {
            styles::TITLE
        };
        lines.push(Line::from(vec![
            Span::styled(message.from, from_style),
            Span::raw(" "),
            Span::raw(message.text),
            Span::styled(format!("  {}", message.ago), styles::MUTED_TEXT),
        ]));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

pub fn render_profile(frame: &mut Frame, area: Rect, state: &AppState) {
    let own = state.own_items();
    let likes: u64 = own.iter().map(|item| item.engagement.likes).sum();
    let mut lines = vec![
        Line::from(Span::styled("@me", styles::TITLE)),
        Line::from(vec![
            Span::styled(own.len().to_string(), styles::TITLE),
            Span::styled(" posts   ", styles::MUTED_TEXT),
            Span::styled(compact_count(likes), styles::TITLE),
            Span::styled(" likes", styles::MUTED_TEXT),
        ]),
        Line::from(Span::styled(", settings", styles::KEY_HINT)),
        Line::default(),
    ];
    if own.is_empty() {
        lines.push(Line::from(Span::styled(
            "No posts yet. Press n to create one.",
            styles::MUTED_TEXT,
        )));
    }
    let width = area.width as usize;
    for item in own {
        lines.push(Line::from(vec![
            Span::styled("▣ ", styles::MUTED_TEXT),
            Span::raw(truncate(&item.description, width.saturating_sub(2))),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

pub fn render_settings(frame: &mut Frame, area: Rect, state: &AppState, hits: &mut HitMap) {
    let mut y = area.y;
    let bottom = area.y + area.height;
    for (section, items) in SETTINGS_SECTIONS {
        if y >= bottom {
            break;
        }
        frame.render_widget(
            Paragraph::new(Span::styled(section, styles::SECTION_HEADER)),
            Rect::new(area.x, y, area.width, 1),
        );
        y += 1;
        for item in items {
            if y >= bottom {
                break;
            }
            let row = Rect::new(area.x, y, area.width, 1);
            let mut spans = vec![Span::raw(format!("  {}", item.label))];
            if item.opens_credential_prompt {
                let status = if state.has_api_key() {
                    Span::styled("  key set", styles::AI_TEXT)
                } else {
                    Span::styled("  no key", styles::ERROR_TEXT)
                };
                spans.push(status);
                hits.push(row, TapTarget::SettingsApiKey);
            }
            spans.push(Span::styled(format!("  {}", item.description), styles::MUTED_TEXT));
            frame.render_widget(Paragraph::new(Line::from(spans)), row);
            y += 1;
        }
        y += 1;
    }
}

pub fn render_search(frame: &mut Frame, area: Rect, state: &AppState, hits: &mut HitMap) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search = &state.search;
    let input_line = if search.input().is_empty() {
        Line::from(Span::styled("Ask anything...", styles::MUTED_TEXT))
    } else {
        Line::from(vec![
            Span::raw(search.input().to_string()),
            Span::styled("▏", styles::AI_TEXT),
        ])
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::AI_TEXT)
        .title(Span::styled(" Search ", styles::AI_TEXT));
    let input_inner = input_block.inner(rows[0]);
    frame.render_widget(Paragraph::new(input_line).block(input_block), rows[0]);
    if !search.input().is_empty() && input_inner.width > 3 && input_inner.height > 0 {
        let clear = Rect::new(input_inner.x + input_inner.width - 3, input_inner.y, 3, 1);
        frame.render_widget(Paragraph::new(Span::styled("[✕]", styles::KEY_HINT)), clear);
        hits.push(clear, TapTarget::SearchClear);
    }

    let body = rows[1];
    match search.phase() {
        SearchPhase::Idle => render_suggestions(frame, body, state, hits),
        SearchPhase::Loading { query, .. } => {
            let lines = vec![
                Line::from(Span::styled(query.as_str().to_string(), styles::TITLE)),
                Line::from(Span::styled(
                    search.stage_message().unwrap_or("Searching..."),
                    styles::AI_TEXT.add_modifier(Modifier::ITALIC),
                )),
            ];
            frame.render_widget(Paragraph::new(lines), body);
        }
        SearchPhase::Answer { query, answer } => {
            let mut lines = vec![
                Line::from(Span::styled(query.as_str().to_string(), styles::TITLE)),
                Line::default(),
            ];
            lines.extend(markdown_lines(&answer.text, Style::default()));
            if !answer.sources.is_empty() {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled("Sources", styles::SECTION_HEADER)));
                for (index, source) in answer.sources.iter().enumerate() {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{}. ", index + 1), styles::MUTED_TEXT),
                        Span::raw(source.title.clone()),
                        Span::styled(format!("  {}", source.uri), styles::MUTED_TEXT),
                    ]));
                }
            }
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
        }
    }
}

fn render_suggestions(frame: &mut Frame, area: Rect, state: &AppState, hits: &mut HitMap) {
    let highlight = state.search.highlight();
    frame.render_widget(
        Paragraph::new(Span::styled("Suggested", styles::SECTION_HEADER)),
        Rect::new(area.x, area.y, area.width, 1.min(area.height)),
    );
    for (index, query) in suggestions().iter().enumerate() {
        let y = area.y + 1 + index as u16;
        if y >= area.y + area.height {
            break;
        }
        let row = Rect::new(area.x, y, area.width, 1);
        let style = if highlight == Some(index) {
            styles::SELECTED
        } else {
            Style::default()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!("  {}", query.as_str()), style)),
            row,
        );
        hits.push(row, TapTarget::SearchSuggestion(index));
    }
}
