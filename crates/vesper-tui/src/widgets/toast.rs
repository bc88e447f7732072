//! Transient notification popup

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// The most recent notification and when it was shown
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub is_error: bool,
    shown_at: Instant,
}

impl Toast {
    pub fn new(text: impl Into<String>, is_error: bool) -> Self {
        Self::shown_at(text, is_error, Instant::now())
    }

    pub fn shown_at(text: impl Into<String>, is_error: bool, at: Instant) -> Self {
        Self {
            text: text.into(),
            is_error,
            shown_at: at,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= TOAST_DURATION
    }

    /// Box in the top right corner of `area`, sized to the text
    pub fn area(&self, area: Rect) -> Rect {
        let max_width = area.width.saturating_sub(2).max(1);
        let text_width = u16::try_from(self.text.width()).unwrap_or(u16::MAX);
        let width = text_width
            .saturating_add(4)
            .clamp(12.min(max_width), max_width);
        let inner_width = width.saturating_sub(2).max(1) as usize;
        let lines = textwrap::wrap(&self.text, inner_width).len();
        let height = u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .saturating_add(2)
            .min(area.height);
        Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y: area.y + 1.min(area.height.saturating_sub(height)),
            width,
            height,
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let popup = self.area(area);
        if popup.width < 3 || popup.height < 3 {
            return;
        }

        let style = if self.is_error {
            theme.error_style()
        } else {
            theme.success_style()
        };

        Clear.render(popup, buf);
        let block = Block::default().borders(Borders::ALL).border_style(style);
        Paragraph::new(Line::styled(self.text.as_str(), style))
            .wrap(Wrap { trim: true })
            .block(block)
            .render(popup, buf);
    }
}
