//! Feed rendering: snap-scrolled cards with side rail, transport controls
//! and the per-card overlay.
//!
//! Only a card that fills the viewport exactly registers click regions; while
//! the feed is mid-scroll the visible slices are drawn as plain previews.

use super::hit_map::HitMap;
use super::styles;
use super::text::{fit, markdown_lines, truncate};
use crate::model::catalog::{sample_comments, ANALYSIS_OPTIONS, SHARE_TARGETS};
use crate::model::{compact_count, MediaKind, VideoItem};
use crate::state::transport::format_time;
use crate::state::{AnalysisPanel, AppState, CardButton, FeedCard, Sheet, TapTarget};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Width of the side action rail.
pub const RAIL_WIDTH: u16 = 9;

/// Rows used by the transport controls.
const CONTROLS_HEIGHT: u16 = 2;

/// Cells in the volume bar.
const VOLUME_SLIDER_WIDTH: u16 = 10;

pub fn render_feed(frame: &mut Frame, area: Rect, state: &AppState, hits: &mut HitMap) {
    let feed = state.feed();
    let cards = feed.cards();
    if cards.is_empty() || area.height == 0 {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Nothing here yet. Follow someone or press n to create.",
            styles::MUTED_TEXT,
        )))
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(hint, area);
        return;
    }

    let h = feed.card_height() as i64;
    let offset = feed.offset_rows() as i64;
    for (index, card) in cards.iter().enumerate() {
        let top = index as i64 * h - offset;
        let bottom = top + h;
        if bottom <= 0 || top >= area.height as i64 {
            continue;
        }
        let Some(item) = state.item(card.item_id()) else {
            continue;
        };
        if top == 0 && h == area.height as i64 {
            render_card(frame, area, card, item, hits);
        } else {
            let y = area.y as i64 + top.max(0);
            let visible = bottom.min(area.height as i64) - top.max(0);
            let slice = Rect::new(area.x, y as u16, area.width, visible as u16);
            render_slice(frame, slice, (-top).max(0) as u16, item);
        }
    }
}

/// Preview of a card that is partly scrolled out of view.
fn render_slice(frame: &mut Frame, area: Rect, skip: u16, item: &VideoItem) {
    let lines = vec![
        Line::from(Span::styled(format!("@{}", item.author.display_name), styles::TITLE)),
        Line::from(Span::styled(item.description.clone(), Style::default())),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(styles::MUTED_TEXT))
        .scroll((skip, 0));
    frame.render_widget(paragraph, area);
}

fn render_card(frame: &mut Frame, card_area: Rect, card: &FeedCard, item: &VideoItem, hits: &mut HitMap) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(RAIL_WIDTH)])
        .split(card_area);
    let media_area = columns[0];
    let rail_area = columns[1];

    hits.push_media(media_area, card_area);
    render_media(frame, media_area, card, item);
    render_bursts(frame, media_area, card_area, card);

    let inner = media_area.inner(ratatui::layout::Margin::new(1, 1));
    if card.is_playable() && card.playback.controls_visible && inner.height > CONTROLS_HEIGHT {
        let controls = Rect::new(
            inner.x,
            inner.y + inner.height - CONTROLS_HEIGHT,
            inner.width,
            CONTROLS_HEIGHT,
        );
        render_controls(frame, controls, card, hits);
    }

    render_rail(frame, rail_area, card, item, hits);

    if let Some(sheet) = card.overlay.sheet() {
        render_sheet(frame, card_area, sheet, hits);
    } else if let Some(panel) = card.overlay.analysis() {
        render_analysis(frame, media_area, panel, hits);
    }
}

fn render_media(frame: &mut Frame, area: Rect, card: &FeedCard, item: &VideoItem) {
    let mut title = vec![Span::styled(format!(" @{} ", item.author.display_name), styles::TITLE)];
    if item.author.following {
        title.push(Span::styled("· following ", styles::MUTED_TEXT));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::MUTED_TEXT)
        .title(Line::from(title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let state_line = match card.kind() {
        MediaKind::Image => Line::from(Span::styled("▣ image", styles::MUTED_TEXT)),
        MediaKind::Video if card.playback.playing => {
            Line::from(Span::styled("▶ playing", styles::AI_TEXT))
        }
        MediaKind::Video => Line::from(Span::styled("❚❚ paused", styles::KEY_HINT)),
    };
    let mut lines = vec![
        state_line,
        Line::from(Span::styled(
            truncate(&item.media.display_uri(), width),
            styles::MUTED_TEXT,
        )),
    ];

    let mut footer = vec![
        Line::from(Span::styled(item.description.clone(), Style::default())),
        Line::from(Span::styled(
            truncate(&format!("♪ {}", item.audio_label), width),
            styles::MUTED_TEXT,
        )),
    ];
    let reserved = if card.is_playable() && card.playback.controls_visible {
        CONTROLS_HEIGHT
    } else {
        0
    };
    let used = lines.len() as u16 + footer.len() as u16 + reserved;
    for _ in used..inner.height {
        lines.push(Line::default());
    }
    lines.append(&mut footer);

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_bursts(frame: &mut Frame, media: Rect, card_area: Rect, card: &FeedCard) {
    let buf = frame.buffer_mut();
    for burst in card.bursts.iter() {
        let x = card_area.x.saturating_add(burst.x);
        let y = card_area.y.saturating_add(burst.y);
        if !media.contains(ratatui::layout::Position::new(x, y)) {
            continue;
        }
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_symbol("♥").set_style(styles::LIKED);
        }
    }
}

fn render_controls(frame: &mut Frame, area: Rect, card: &FeedCard, hits: &mut HitMap) {
    let playback = &card.playback;
    hits.push(area, TapTarget::Controls);

    let elapsed = format_time(playback.current_time);
    let total = format_time(playback.duration);
    let label_width = (elapsed.len() + total.len() + 2) as u16;
    let bar_width = area.width.saturating_sub(label_width);
    let bar = Rect::new(area.x, area.y, bar_width, 1);
    let filled = ((bar_width as f64) * playback.progress()).round() as usize;
    let mut bar_text = "━".repeat(filled.min(bar_width as usize));
    bar_text.push_str(&"─".repeat((bar_width as usize).saturating_sub(filled)));
    frame.render_widget(Paragraph::new(Span::styled(bar_text, styles::LIKED)), bar);
    hits.push_scrubber(bar);
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {elapsed}/{total}"), styles::MUTED_TEXT)),
        Rect::new(area.x + bar_width, area.y, area.width - bar_width, 1),
    );

    let row = area.y + 1;
    let mut x = area.x;
    let volume = format!("{:>3}%", (playback.display_volume() * 100.0).round() as u32);
    let buttons = [
        (if playback.playing { "[❚❚]" } else { "[▶]" }, CardButton::PlayPause),
        (if playback.muted { "[🔇]" } else { "[🔊]" }, CardButton::Mute),
        ("[-]", CardButton::VolumeDown),
        ("[+]", CardButton::VolumeUp),
    ];
    for (label, button) in buttons {
        let width = unicode_width::UnicodeWidthStr::width(label) as u16;
        if x + width > area.x + area.width {
            break;
        }
        let rect = Rect::new(x, row, width, 1);
        frame.render_widget(Paragraph::new(Span::styled(label, styles::KEY_HINT)), rect);
        hits.push(rect, TapTarget::Button(button));
        x += width + 1;
    }
    if x + VOLUME_SLIDER_WIDTH <= area.x + area.width {
        let slider = Rect::new(x, row, VOLUME_SLIDER_WIDTH, 1);
        let filled = ((VOLUME_SLIDER_WIDTH as f32) * playback.display_volume()).round() as usize;
        let filled = filled.min(VOLUME_SLIDER_WIDTH as usize);
        let mut slider_text = "█".repeat(filled);
        slider_text.push_str(&"░".repeat(VOLUME_SLIDER_WIDTH as usize - filled));
        frame.render_widget(Paragraph::new(Span::styled(slider_text, styles::KEY_HINT)), slider);
        hits.push_volume_slider(slider);
        x += VOLUME_SLIDER_WIDTH + 1;
    }
    if x + volume.len() as u16 <= area.x + area.width {
        frame.render_widget(
            Paragraph::new(Span::styled(volume.clone(), styles::MUTED_TEXT)),
            Rect::new(x, row, volume.len() as u16, 1),
        );
    }
}

fn render_rail(frame: &mut Frame, area: Rect, card: &FeedCard, item: &VideoItem, hits: &mut HitMap) {
    let like_style = if card.liked {
        styles::LIKED
    } else {
        Style::default()
    };
    let follow = if item.author.following { "✓" } else { "+" };
    let entries = [
        (follow.to_string(), "follow".to_string(), Style::default(), CardButton::Follow),
        ("♥".to_string(), compact_count(item.engagement.likes), like_style, CardButton::Like),
        ("≡".to_string(), compact_count(item.engagement.comments), Style::default(), CardButton::Comments),
        ("↗".to_string(), compact_count(item.engagement.shares), Style::default(), CardButton::Share),
        ("✦".to_string(), "AI".to_string(), styles::AI_TEXT, CardButton::Analysis),
    ];

    let mut y = area.y + 1;
    for (icon, label, style, button) in entries {
        if y + 2 > area.y + area.height {
            break;
        }
        let rect = Rect::new(area.x, y, area.width, 2);
        let lines = vec![
            Line::from(Span::styled(icon, style.add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(fit(&label, area.width as usize), styles::MUTED_TEXT)),
        ];
        frame.render_widget(
            Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center),
            rect,
        );
        hits.push(rect, TapTarget::Button(button));
        y += 3;
    }
}

/// Bottom part of `area` covering `percent` of its height.
fn bottom_part(area: Rect, percent: u16) -> Rect {
    let height = (area.height * percent / 100).max(3).min(area.height);
    Rect::new(area.x, area.y + area.height - height, area.width, height)
}

fn render_sheet(frame: &mut Frame, card_area: Rect, sheet: Sheet, hits: &mut HitMap) {
    frame.buffer_mut().set_style(card_area, styles::BACKDROP);
    hits.push(card_area, TapTarget::SheetBackdrop(sheet));

    let body = bottom_part(card_area, 60);
    frame.render_widget(Clear, body);
    hits.push(body, TapTarget::SheetBody);

    let (title, lines) = match sheet {
        Sheet::Comments => {
            let comments = sample_comments();
            let mut lines = Vec::new();
            for comment in &comments {
                lines.push(Line::from(vec![
                    Span::styled(comment.author_name.clone(), styles::TITLE),
                    Span::styled(format!("  {}", comment.posted_ago), styles::MUTED_TEXT),
                    Span::styled(format!("  ♥ {}", compact_count(comment.likes)), styles::MUTED_TEXT),
                ]));
                lines.push(Line::from(comment.text.clone()));
            }
            (format!(" {} comments ", comments.len()), lines)
        }
        Sheet::Share => {
            let lines = SHARE_TARGETS
                .iter()
                .map(|target| Line::from(format!("  {target}")))
                .collect();
            (" Share to ".to_string(), lines)
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::SECTION_HEADER)
        .title(Span::styled(title, styles::SECTION_HEADER))
        .title_bottom(Line::from(Span::styled(" Esc or tap outside to close ", styles::MUTED_TEXT)));
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), body);
}

fn render_analysis(frame: &mut Frame, media_area: Rect, panel: &AnalysisPanel, hits: &mut HitMap) {
    let drawer = bottom_part(media_area, 55);
    frame.render_widget(Clear, drawer);
    hits.push(drawer, TapTarget::SheetBody);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::AI_TEXT)
        .title(Span::styled(" ✦ AI analysis ", styles::AI_TEXT.add_modifier(Modifier::BOLD)));
    let inner = block.inner(drawer);
    frame.render_widget(block, drawer);

    match panel {
        AnalysisPanel::Picker => {
            for (index, option) in ANALYSIS_OPTIONS.iter().enumerate() {
                let y = inner.y + index as u16;
                if y >= inner.y + inner.height {
                    break;
                }
                let row = Rect::new(inner.x, y, inner.width, 1);
                let line = Line::from(vec![
                    Span::styled(format!("{}. ", index + 1), styles::KEY_HINT),
                    Span::raw(option.label),
                ]);
                frame.render_widget(Paragraph::new(line), row);
                hits.push(row, TapTarget::AnalysisOption(index));
            }
        }
        AnalysisPanel::Loading { option } => {
            let line = Line::from(Span::styled(
                format!("Analyzing: {}...", option.label),
                styles::AI_TEXT.add_modifier(Modifier::ITALIC),
            ));
            frame.render_widget(Paragraph::new(line), inner);
        }
        AnalysisPanel::Result { option, text } => {
            let mut lines = vec![Line::from(Span::styled(option.label, styles::SECTION_HEADER))];
            lines.extend(markdown_lines(text, Style::default()));
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        }
    }
}
