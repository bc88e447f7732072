//! Status line with an animated spinner while busy

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Spinner frame for the time elapsed since `start`
pub fn spinner_frame(start: Instant, now: Instant) -> &'static str {
    let elapsed = now.saturating_duration_since(start);
    let index = (elapsed.as_millis() / FRAME_DURATION.as_millis()) as usize;
    SPINNER_FRAMES[index % SPINNER_FRAMES.len()]
}

/// One-line status: label on the left, key hints on the right
pub struct StatusBar<'a> {
    label: &'a str,
    hint: &'a str,
    theme: &'a Theme,
    busy_since: Option<Instant>,
}

impl<'a> StatusBar<'a> {
    pub fn new(label: &'a str, theme: &'a Theme) -> Self {
        Self {
            label,
            hint: "",
            theme,
            busy_since: None,
        }
    }

    pub fn hint(mut self, hint: &'a str) -> Self {
        self.hint = hint;
        self
    }

    /// Show the spinner, animated from `start`
    pub fn busy(mut self, start: Option<Instant>) -> Self {
        self.busy_since = start;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height == 0 {
            return;
        }

        let left = match self.busy_since {
            Some(start) => Span::styled(
                format!("{} {}", spinner_frame(start, Instant::now()), self.label),
                self.theme.accent_style(),
            ),
            None => Span::styled(self.label.to_string(), self.theme.dim_style()),
        };

        let available = area.width as usize;
        let left_width = left.content.width();
        let hint_width = self.hint.width();

        // Hints only when they fit next to the label
        let line = if !self.hint.is_empty() && left_width + hint_width + 2 <= available {
            Line::from(vec![
                left,
                Span::raw(" ".repeat(available - left_width - hint_width)),
                Span::styled(self.hint, self.theme.dim_style()),
            ])
        } else {
            Line::from(left)
        };

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, 0)).map(|c| c.symbol().to_string()))
            .collect()
    }

    #[test]
    fn test_spinner_advances_every_frame() {
        let start = Instant::now();
        assert_eq!(spinner_frame(start, start), "⠋");
        assert_eq!(spinner_frame(start, start + FRAME_DURATION), "⠙");
        assert_eq!(
            spinner_frame(start, start + FRAME_DURATION * SPINNER_FRAMES.len() as u32),
            "⠋"
        );
    }

    #[test]
    fn test_hint_right_aligned_when_it_fits() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new("Ready", &theme)
            .hint("Ctrl+C: quit")
            .render(area, &mut buf);

        let text = row(&buf);
        assert!(text.starts_with("Ready"));
        assert!(text.ends_with("Ctrl+C: quit"));
    }

    #[test]
    fn test_hint_dropped_when_narrow() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new("Ready", &theme)
            .hint("Ctrl+C: quit")
            .render(area, &mut buf);

        assert_eq!(row(&buf).trim_end(), "Ready");
    }

    #[test]
    fn test_busy_shows_spinner() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new("Thinking...", &theme)
            .busy(Some(Instant::now()))
            .render(area, &mut buf);

        let text = row(&buf);
        assert!(SPINNER_FRAMES.iter().any(|f| text.starts_with(f)));
        assert!(text.contains("Thinking..."));
    }
}
