//! Input handling

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter: send the input
    Submit,
    /// Shift+Enter / Alt+Enter: literal line break
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    /// Start of the current line
    Home,
    /// End of the current line
    End,
    PageUp,
    PageDown,
    Escape,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+L (clear history)
    Clear,
    /// Ctrl+U (clear input)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Bracketed paste
    Paste(String),
    /// Ctrl+Q
    Quit,
    /// Unknown/unhandled
    Unknown,
}

impl Action {
    /// Whether this action ends the session
    pub fn is_quit(&self) -> bool {
        matches!(self, Action::Quit | Action::Interrupt | Action::Escape)
    }
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if code == KeyCode::Enter {
        return if modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
            Action::Newline
        } else {
            Action::Submit
        };
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('l') => Action::Clear,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            // Terminals without keyboard enhancement report Shift+Enter as Ctrl+J
            KeyCode::Char('j') => Action::Newline,
            KeyCode::Char('q') => Action::Quit,
            _ => Action::Unknown,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action.
///
/// Key releases are dropped; they only arrive with keyboard enhancement on.
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            Some(key_to_action(key_event))
        }
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}
