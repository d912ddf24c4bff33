//! Text helpers: width-aware truncation and Markdown rendering.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cut `text` to at most `width` terminal cells, ending with `…` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Render Markdown to owned lines. Plain spans inherit `base`.
pub fn markdown_lines(markdown: &str, base: Style) -> Vec<Line<'static>> {
    tui_markdown::from_str(markdown)
        .lines
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.into_owned(), base.patch(span.style)))
                .collect();
            Line::from(spans).style(line.style)
        })
        .collect()
}

/// Pad or cut `text` to exactly `width` cells.
pub fn fit(text: &str, width: usize) -> String {
    let cut = truncate(text, width);
    let pad = width.saturating_sub(cut.width());
    format!("{cut}{}", " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn truncate_adds_ellipsis_within_width() {
        let cut = truncate("hello world", 6);
        assert_eq!(cut, "hello…");
        assert_eq!(cut.width(), 6);
    }

    #[test]
    fn truncate_counts_wide_chars_as_two_cells() {
        let cut = truncate("🌊🌊🌊", 4);
        assert_eq!(cut, "🌊…");
        assert!(cut.width() <= 4);
    }

    #[test]
    fn fit_pads_to_width() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4).width(), 4);
    }

    #[test]
    fn markdown_bullets_render_as_lines() {
        let lines = markdown_lines("- one\n- two", Style::default());
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l.contains("one")));
        assert!(text.iter().any(|l| l.contains("two")));
    }
}
