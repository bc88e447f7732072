//! Message list widget for displaying the conversation

use crate::theme::Theme;
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use vesper_api::{Message, Role};

/// Header labels for the two roles
#[derive(Debug, Clone, Copy)]
pub struct RoleLabels<'a> {
    pub user: &'a str,
    pub assistant: &'a str,
}

impl Default for RoleLabels<'_> {
    fn default() -> Self {
        Self {
            user: "You",
            assistant: "Assistant",
        }
    }
}

/// Widget for displaying a list of chat messages
pub struct MessageList<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
    labels: RoleLabels<'a>,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            labels: RoleLabels::default(),
            scroll: 0,
        }
    }

    pub fn labels(mut self, labels: RoleLabels<'a>) -> Self {
        self.labels = labels;
        self
    }

    /// Set scroll offset (in lines)
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

/// Lines for one message: header, wrapped body, blank separator
fn message_lines(
    msg: &Message,
    width: usize,
    theme: &Theme,
    labels: RoleLabels<'_>,
) -> Vec<Line<'static>> {
    let (label, style, prefix) = match msg.role {
        Role::User => (labels.user, theme.user_style(), "▶ "),
        Role::Assistant => (labels.assistant, theme.assistant_style(), "◀ "),
    };
    let time = msg.timestamp.with_timezone(&Local).format("%H:%M").to_string();

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{}{}", prefix, label), style),
        Span::styled(format!("  {}", time), theme.dim_style()),
    ])];

    let content_width = width.saturating_sub(2).max(1);
    for line in textwrap::wrap(&msg.content, content_width) {
        lines.push(Line::from(Span::styled(
            format!("  {}", line),
            theme.base_style(),
        )));
    }

    lines.push(Line::from(""));
    lines
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let visible: Vec<Line> = self
            .messages
            .iter()
            .flat_map(|msg| message_lines(msg, width, self.theme, self.labels))
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Calculate total height of messages in lines
pub fn calculate_message_height(messages: &[Message], width: usize) -> usize {
    let theme = Theme::dark();
    messages
        .iter()
        .map(|msg| message_lines(msg, width, &theme, RoleLabels::default()).len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(id: &str, role: Role, content: &str) -> Message {
        Message::new(
            id,
            role,
            content,
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        )
    }

    fn buffer_lines(buf: &Buffer) -> Vec<String> {
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_height_counts_header_body_and_separator() {
        let messages = vec![
            msg("1", Role::User, "hi"),
            msg("2", Role::Assistant, "line one\nline two"),
        ];
        assert_eq!(calculate_message_height(&messages, 40), 3 + 4);
    }

    #[test]
    fn test_long_content_wraps() {
        let messages = vec![msg("1", Role::Assistant, "aaaa bbbb cccc")];
        // 10 columns leave 8 for content after the indent
        assert_eq!(calculate_message_height(&messages, 10), 1 + 3 + 1);
    }

    #[test]
    fn test_render_in_order_with_labels() {
        let theme = Theme::dark();
        let messages = vec![
            msg("1", Role::User, "question"),
            msg("2", Role::Assistant, "answer"),
        ];
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);

        MessageList::new(&messages, &theme)
            .labels(RoleLabels {
                user: "Вы",
                assistant: "Ассистент",
            })
            .render(area, &mut buf);

        let lines = buffer_lines(&buf);
        assert!(lines[0].starts_with("▶ Вы"));
        assert_eq!(lines[1], "  question");
        assert!(lines[3].starts_with("◀ Ассистент"));
        assert_eq!(lines[4], "  answer");
    }

    #[test]
    fn test_scroll_skips_lines() {
        let theme = Theme::dark();
        let messages = vec![msg("1", Role::User, "first"), msg("2", Role::User, "second")];
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);

        MessageList::new(&messages, &theme)
            .scroll(3)
            .render(area, &mut buf);

        let lines = buffer_lines(&buf);
        assert!(lines[0].starts_with("▶ You"));
        assert_eq!(lines[1], "  second");
    }
}
