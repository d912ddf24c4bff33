//! Create modal: camera recording and AI generation.

use super::hit_map::HitMap;
use super::styles;
use super::text::truncate;
use crate::state::{CreateFlow, CreateMode, FlowState, TapTarget};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Render the modal over the whole `area`.
pub fn render_create_modal(frame: &mut Frame, area: Rect, flow: &CreateFlow, hits: &mut HitMap) {
    frame.render_widget(Clear, area);
    // Swallow taps that miss every control.
    hits.push(area, TapTarget::SheetBody);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::LIKED)
        .title(Span::styled(" Create ", styles::TITLE));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // close + mode tabs
            Constraint::Length(1),
            Constraint::Min(0),    // body
            Constraint::Length(1), // buttons
            Constraint::Length(1), // hints
        ])
        .split(inner);

    render_header(frame, rows[0], flow, hits);
    render_body(frame, rows[2], flow, hits);
    render_buttons(frame, rows[3], flow, hits);
    render_hints(frame, rows[4], flow);
}

fn render_header(frame: &mut Frame, area: Rect, flow: &CreateFlow, hits: &mut HitMap) {
    if area.height == 0 {
        return;
    }
    let close = Rect::new(area.x, area.y, 3.min(area.width), 1);
    frame.render_widget(Paragraph::new(Span::styled("[✕]", styles::KEY_HINT)), close);
    hits.push(close, TapTarget::CreateClose);

    let mut x = area.x + 5;
    for mode in CreateMode::ALL {
        let label = format!(" {} ", mode.label());
        let width = label.width() as u16;
        if x + width > area.x + area.width {
            break;
        }
        let style = if mode == flow.mode() {
            styles::SELECTED
        } else if flow.can_switch_mode() {
            Style::default()
        } else {
            styles::MUTED_TEXT
        };
        let rect = Rect::new(x, area.y, width, 1);
        frame.render_widget(Paragraph::new(Span::styled(label, style)), rect);
        hits.push(rect, TapTarget::CreateMode(mode));
        x += width + 1;
    }
}

fn render_body(frame: &mut Frame, area: Rect, flow: &CreateFlow, hits: &mut HitMap) {
    let width = area.width as usize;
    let lines: Vec<Line> = match flow.state() {
        FlowState::CameraLive { notice } => match notice {
            Some(notice) => vec![
                Line::from(Span::styled("Camera unavailable", styles::ERROR_TEXT)),
                Line::from(notice.clone()),
            ],
            None => vec![
                Line::from(Span::styled("● LIVE", styles::LIKED)),
                Line::from(Span::styled(
                    truncate(flow.stream_label().unwrap_or("camera"), width),
                    styles::MUTED_TEXT,
                )),
            ],
        },
        FlowState::Recording { .. } => vec![
            Line::from(vec![
                Span::styled("● REC ", styles::LIKED.add_modifier(Modifier::SLOW_BLINK)),
                Span::styled(flow.record_label().unwrap_or_default(), styles::TITLE),
            ]),
            Line::from(Span::styled(
                truncate(flow.stream_label().unwrap_or("camera"), width),
                styles::MUTED_TEXT,
            )),
        ],
        FlowState::Review { clip } => vec![
            Line::from(Span::styled("Review your clip", styles::TITLE)),
            Line::from(Span::styled(
                format!(
                    "{} · {} bytes · {:.1}s",
                    clip.mime,
                    clip.bytes.len(),
                    clip.duration.as_secs_f64()
                ),
                styles::MUTED_TEXT,
            )),
        ],
        FlowState::PromptEntry { error } => {
            return render_prompt(frame, area, flow, error.as_deref(), hits);
        }
        FlowState::Generating { .. } => vec![
            Line::from(Span::styled(
                flow.status_message().unwrap_or("Working..."),
                styles::AI_TEXT.add_modifier(Modifier::ITALIC),
            )),
            Line::from(Span::styled(truncate(flow.prompt(), width), styles::MUTED_TEXT)),
        ],
        FlowState::Closed => Vec::new(),
    };
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_prompt(
    frame: &mut Frame,
    area: Rect,
    flow: &CreateFlow,
    error: Option<&str>,
    hits: &mut HitMap,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let placeholder = match flow.mode() {
        CreateMode::Image => "Describe the image to create...",
        _ => "Describe the video to create...",
    };
    let text = if flow.prompt().is_empty() {
        Line::from(Span::styled(placeholder, styles::MUTED_TEXT))
    } else {
        Line::from(vec![
            Span::raw(flow.prompt().to_string()),
            Span::styled("▏", styles::AI_TEXT),
        ])
    };
    let input = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::AI_TEXT)
                .title(Span::styled(" Prompt ", styles::AI_TEXT)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(input, rows[0]);

    if flow.mode() == CreateMode::Image && rows[1].height > 0 {
        let label = format!("Size: [{}]", flow.image_size().as_str());
        let rect = Rect::new(rows[1].x, rows[1].y, (label.width() as u16).min(rows[1].width), 1);
        frame.render_widget(Paragraph::new(Span::styled(label, styles::KEY_HINT)), rect);
        hits.push(rect, TapTarget::CreateImageSize);
    }

    if let Some(error) = error.filter(|_| rows[2].height > 0) {
        frame.render_widget(
            Paragraph::new(Span::styled(truncate(error, rows[2].width as usize), styles::ERROR_TEXT)),
            rows[2],
        );
    }
}

fn primary_label(state: &FlowState) -> Option<&'static str> {
    match state {
        FlowState::CameraLive { notice: None } => Some(" ● Record "),
        FlowState::Recording { .. } => Some(" ■ Stop "),
        FlowState::Review { .. } => Some(" Post "),
        FlowState::PromptEntry { .. } => Some(" ✦ Generate "),
        _ => None,
    }
}

fn render_buttons(frame: &mut Frame, area: Rect, flow: &CreateFlow, hits: &mut HitMap) {
    if area.height == 0 {
        return;
    }
    let mut x = area.x;
    if let Some(label) = primary_label(flow.state()) {
        let width = (label.width() as u16).min(area.width);
        let rect = Rect::new(x, area.y, width, 1);
        frame.render_widget(Paragraph::new(Span::styled(label, styles::SELECTED)), rect);
        hits.push(rect, TapTarget::CreatePrimary);
        x += width + 2;
    }
    if matches!(flow.state(), FlowState::Review { .. }) {
        let label = " Discard ";
        let width = label.width() as u16;
        if x + width <= area.x + area.width {
            let rect = Rect::new(x, area.y, width, 1);
            frame.render_widget(Paragraph::new(Span::styled(label, styles::KEY_HINT)), rect);
            hits.push(rect, TapTarget::CreateDiscard);
        }
    }
}

fn render_hints(frame: &mut Frame, area: Rect, flow: &CreateFlow) {
    let hint = match flow.state() {
        FlowState::CameraLive { .. } => "Space record · Tab mode · Esc close",
        FlowState::Recording { .. } => "Space stop",
        FlowState::Review { .. } => "Enter post · d discard · Esc close",
        FlowState::PromptEntry { .. } if flow.mode() == CreateMode::Image => {
            "Enter generate · ↑/↓ size · Tab mode · Esc close"
        }
        FlowState::PromptEntry { .. } => "Enter generate · Tab mode · Esc close",
        FlowState::Generating { .. } => "Esc cancel",
        FlowState::Closed => "",
    };
    frame.render_widget(Paragraph::new(Span::styled(hint, styles::MUTED_TEXT)), area);
}
