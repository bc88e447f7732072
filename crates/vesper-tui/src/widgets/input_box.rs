//! Multi-line text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Text input that keeps literal line breaks
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    /// Cursor position (character index, not byte index)
    cursor: usize,
    placeholder: String,
    focused: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content and move the cursor to the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Number of lines in the content (at least one)
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// Height including borders, growing with the content up to `max_lines`
    pub fn height(&self, max_lines: u16) -> u16 {
        let lines = self.line_count().min(max_lines.max(1) as usize) as u16;
        lines + 2
    }

    /// Cursor row and character column
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: Vec<char> = self.content.chars().take(self.cursor).collect();
        let row = before.iter().filter(|&&c| c == '\n').count();
        let col = before.iter().rev().take_while(|&&c| c != '\n').count();
        (row, col)
    }

    /// Apply an editing action. Returns whether the content or cursor changed.
    pub fn handle_action(&mut self, action: &Action) -> bool {
        let char_count = self.content.chars().count();

        match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Newline => {
                self.insert_char('\n');
                true
            }
            Action::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_char_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Delete => {
                if self.cursor < char_count {
                    self.remove_char_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    true
                } else {
                    false
                }
            }
            Action::Right => {
                if self.cursor < char_count {
                    self.cursor += 1;
                    true
                } else {
                    false
                }
            }
            Action::Home => {
                self.cursor = self.line_start(self.cursor);
                true
            }
            Action::End => {
                self.cursor = self.line_end(self.cursor);
                true
            }
            Action::Up => self.move_vertical(false),
            Action::Down => self.move_vertical(true),
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                while start > 0 && !chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                if start == self.cursor {
                    return false;
                }
                let range = self.byte_offset(start)..self.byte_offset(self.cursor);
                self.content.drain(range);
                self.cursor = start;
                true
            }
            Action::Paste(text) => {
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                for c in text.chars() {
                    self.insert_char(c);
                }
                true
            }
            _ => false,
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    fn remove_char_at(&mut self, char_index: usize) {
        let at = self.byte_offset(char_index);
        if at < self.content.len() {
            self.content.remove(at);
        }
    }

    fn line_start(&self, index: usize) -> usize {
        let chars: Vec<char> = self.content.chars().take(index).collect();
        chars
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn line_end(&self, index: usize) -> usize {
        index
            + self
                .content
                .chars()
                .skip(index)
                .take_while(|&c| c != '\n')
                .count()
    }

    fn move_vertical(&mut self, down: bool) -> bool {
        let start = self.line_start(self.cursor);
        let col = self.cursor - start;
        let end = self.line_end(self.cursor);

        let (target_start, target_end) = if down {
            if end >= self.content.chars().count() {
                return false;
            }
            (end + 1, self.line_end(end + 1))
        } else {
            if start == 0 {
                return false;
            }
            (self.line_start(start - 1), start - 1)
        };
        self.cursor = (target_start + col).min(target_end);
        true
    }

    /// Display width of the cursor's line up to the cursor
    fn cursor_display_col(&self) -> usize {
        let start = self.line_start(self.cursor);
        self.content
            .chars()
            .skip(start)
            .take(self.cursor - start)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.content.is_empty() {
            Paragraph::new(self.placeholder.as_str())
                .style(theme.dim_style())
                .render(inner, buf);
        }

        // Keep the cursor in view
        let (row, _) = self.cursor_line_col();
        let col = self.cursor_display_col();
        let scroll_y = row.saturating_sub(inner.height as usize - 1);
        let scroll_x = col.saturating_sub(inner.width as usize - 1);

        if !self.content.is_empty() {
            let lines: Vec<Line> = self.content.split('\n').map(Line::raw).collect();
            Paragraph::new(lines)
                .style(theme.base_style())
                .scroll((scroll_y as u16, scroll_x as u16))
                .render(inner, buf);
        }

        if self.focused {
            let x = inner.x + (col - scroll_x) as u16;
            let y = inner.y + (row - scroll_y) as u16;
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_style(Style::default().bg(theme.accent));
            }
        }
    }
}
