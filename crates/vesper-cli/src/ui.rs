//! TUI implementation for vesper

use tokio::sync::{broadcast, mpsc};

use crossterm::event::{Event, EventStream, MouseEventKind};
use futures::StreamExt;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::time::{Duration, Instant};
use vesper_api::Message;
use vesper_chat::{ChatController, ChatEvent, Locale, Notification};
use vesper_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{
        InputBox, MessageList, RoleLabels, StatusBar, Toast, message_list::calculate_message_height,
    },
};

/// Lines moved per PgUp/PgDn
const PAGE_LINES: usize = 10;
/// Input box never grows past this many lines
const MAX_INPUT_LINES: u16 = 6;

/// Messages sent from UI to the event loop
#[derive(Debug, PartialEq, Eq)]
pub enum UiMessage {
    /// Send this text as the next user message
    Submit(String),
    /// Clear the whole history
    Clear,
}

/// TUI application state
pub struct TuiState {
    chat: ChatController,
    /// Mirror of the controller's messages
    messages: Vec<Message>,
    input: InputBox,
    /// Scroll position in lines; `usize::MAX` follows the bottom
    scroll: usize,
    /// Largest useful scroll from the last render
    max_scroll: usize,
    is_sending: bool,
    spinner_start: Instant,
    toast: Option<Toast>,
    theme: Theme,
    locale: Locale,
    ui_tx: mpsc::Sender<UiMessage>,
}

impl TuiState {
    pub fn new(chat: ChatController, ui_tx: mpsc::Sender<UiMessage>) -> Self {
        let locale = chat.locale();
        let mut input = InputBox::new().with_placeholder(locale.input_placeholder());
        input.set_focused(true);

        Self {
            messages: chat.messages(),
            is_sending: chat.is_sending(),
            chat,
            input,
            scroll: usize::MAX,
            max_scroll: 0,
            spinner_start: Instant::now(),
            toast: None,
            theme: Theme::dark(),
            locale,
            ui_tx,
        }
    }

    /// Handle chat controller events
    pub fn handle_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::MessageAppended { message } => {
                self.messages.push(message);
                self.scroll_to_bottom();
            }
            ChatEvent::Loaded { .. } | ChatEvent::Cleared => self.resync(),
            ChatEvent::SendStarted => {
                self.is_sending = true;
                self.spinner_start = Instant::now();
            }
            ChatEvent::SendFinished => {
                self.is_sending = false;
            }
            ChatEvent::Notification { notification } => self.show_notification(&notification),
        }
    }

    /// Re-read everything from the controller
    pub fn resync(&mut self) {
        self.messages = self.chat.messages();
        self.is_sending = self.chat.is_sending();
        self.scroll_to_bottom();
    }

    fn show_notification(&mut self, notification: &Notification) {
        self.toast = Some(Toast::new(
            notification.text.clone(),
            notification.is_error(),
        ));
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved during render
        self.scroll = usize::MAX;
    }

    /// Called on each tick
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }

    /// Handle keyboard action. Returns false to quit.
    pub async fn handle_action(&mut self, action: Action) -> bool {
        match action {
            a if a.is_quit() => false,
            Action::Submit => {
                if !self.is_sending && !self.input.content().trim().is_empty() {
                    // Keys queued behind Enter belong to the next message
                    let text = self.input.content().to_string();
                    self.input.clear();
                    let _ = self.ui_tx.send(UiMessage::Submit(text)).await;
                }
                true
            }
            Action::Clear => {
                let _ = self.ui_tx.send(UiMessage::Clear).await;
                true
            }
            Action::PageUp => {
                self.scroll_lines(true, PAGE_LINES);
                true
            }
            Action::PageDown => {
                self.scroll_lines(false, PAGE_LINES);
                true
            }
            other => {
                self.input.handle_action(&other);
                true
            }
        }
    }

    fn scroll_lines(&mut self, up: bool, lines: usize) {
        let current = self.scroll.min(self.max_scroll);
        if up {
            self.scroll = current.saturating_sub(lines);
        } else if current + lines >= self.max_scroll {
            self.scroll_to_bottom();
        } else {
            self.scroll = current + lines;
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(self.input.height(MAX_INPUT_LINES)),
            ])
            .split(size);

        self.render_messages(frame, chunks[0]);

        let label = if self.is_sending {
            self.locale.thinking()
        } else {
            self.locale.ready()
        };
        let status = StatusBar::new(label, &self.theme)
            .hint(self.locale.key_hint())
            .busy(self.is_sending.then_some(self.spinner_start));
        frame.render_widget(status, chunks[1]);

        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);

        if let Some(toast) = &self.toast {
            toast.render(size, frame.buffer_mut(), &self.theme);
        }
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(Span::styled(
                format!(" {} ", self.locale.title()),
                self.theme.title_style(),
            ));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }

        if self.messages.is_empty() {
            let welcome = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", self.locale.welcome()),
                    self.theme.title_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", self.locale.welcome_hint()),
                    self.theme.dim_style(),
                )),
            ]);
            frame.render_widget(welcome, inner);
            self.max_scroll = 0;
            return;
        }

        let content_height = calculate_message_height(&self.messages, inner.width as usize);
        self.max_scroll = content_height.saturating_sub(inner.height as usize);
        // Auto-scroll sentinel and stale offsets both clamp here
        self.scroll = self.scroll.min(self.max_scroll);

        let labels = RoleLabels {
            user: self.locale.user_label(),
            assistant: self.locale.assistant_label(),
        };
        let message_list = MessageList::new(&self.messages, &self.theme)
            .labels(labels)
            .scroll(self.scroll);
        frame.render_widget(message_list, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }

        // Keep following the bottom when already there
        if self.scroll == self.max_scroll {
            self.scroll_to_bottom();
        }
    }
}

/// Run the TUI application
pub async fn run_tui(chat: ChatController) -> anyhow::Result<()> {
    use crossterm::{
        event::{
            DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
            PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
        },
        execute,
        terminal::{
            EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            supports_keyboard_enhancement,
        },
    };
    use ratatui::{Terminal, backend::CrosstermBackend};
    use std::io;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    // Needed to tell Shift+Enter from Enter
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);

    // Subscribe before loading so no event is missed
    let mut chat_rx = chat.subscribe();
    let mut state = TuiState::new(chat.clone(), ui_tx);

    tokio::spawn({
        let chat = chat.clone();
        async move {
            chat.load().await;
        }
    });

    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    let result = loop {
        terminal.draw(|frame| state.render(frame))?;

        tokio::select! {
            biased;

            event = chat_rx.recv() => {
                match event {
                    Ok(chat_event) => state.handle_chat_event(chat_event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "ui lagged behind chat events");
                        state.resync();
                    }
                    Err(broadcast::error::RecvError::Closed) => break Ok(()),
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Mouse(mouse))) => match mouse.kind {
                        MouseEventKind::ScrollUp => state.scroll_lines(true, 3),
                        MouseEventKind::ScrollDown => state.scroll_lines(false, 3),
                        _ => {}
                    },
                    Some(Ok(evt)) => {
                        if let Some(action) = event_to_action(evt) {
                            if !state.handle_action(action).await {
                                break Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                }
            }

            _ = tick_interval.tick() => {
                state.tick(Instant::now());
            }

            msg = ui_rx.recv() => {
                match msg {
                    Some(UiMessage::Submit(text)) => {
                        let chat = chat.clone();
                        tokio::spawn(async move {
                            chat.send(&text).await;
                        });
                    }
                    Some(UiMessage::Clear) => {
                        let chat = chat.clone();
                        tokio::spawn(async move {
                            // Failure is reported as a notification
                            let _ = chat.clear().await;
                        });
                    }
                    None => break Ok(()),
                }
            }
        }
    };

    // Restore terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use vesper_api::{Assistant, HistoryStore, Role};

    struct EmptyStore;

    #[async_trait]
    impl HistoryStore for EmptyStore {
        async fn load(&self) -> vesper_api::Result<Vec<Message>> {
            Ok(Vec::new())
        }

        async fn append(&self, _role: Role, _content: &str) -> vesper_api::Result<()> {
            Ok(())
        }

        async fn clear(&self) -> vesper_api::Result<()> {
            Ok(())
        }
    }

    struct Echo;

    #[async_trait]
    impl Assistant for Echo {
        async fn complete(&self, message: &str) -> vesper_api::Result<String> {
            Ok(message.to_uppercase())
        }
    }

    fn make_state() -> (TuiState, mpsc::Receiver<UiMessage>) {
        let chat = ChatController::new(Default::default(), Arc::new(EmptyStore), Arc::new(Echo));
        let (tx, rx) = mpsc::channel(8);
        (TuiState::new(chat, tx), rx)
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c)).await;
        }
    }

    #[tokio::test]
    async fn test_submit_requests_send_and_empties_input() {
        let (mut state, mut rx) = make_state();
        type_text(&mut state, "hi").await;

        assert!(state.handle_action(Action::Submit).await);

        assert_eq!(rx.try_recv().unwrap(), UiMessage::Submit("hi".into()));
        assert_eq!(state.input.content(), "");
    }

    #[tokio::test]
    async fn test_keys_typed_after_enter_start_the_next_message() {
        let (mut state, mut rx) = make_state();
        let mut events = state.chat.subscribe();
        type_text(&mut state, "hi").await;
        state.handle_action(Action::Submit).await;
        type_text(&mut state, " next").await;

        let Ok(UiMessage::Submit(text)) = rx.try_recv() else {
            panic!("expected a submit");
        };
        state.chat.send(&text).await;
        while let Ok(event) = events.try_recv() {
            state.handle_chat_event(event);
        }

        let contents: Vec<&str> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "HI"]);
        assert_eq!(state.input.content(), " next");
    }

    #[tokio::test]
    async fn test_blank_submit_does_nothing() {
        let (mut state, mut rx) = make_state();
        type_text(&mut state, "   ").await;

        state.handle_action(Action::Submit).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_newline_does_not_submit() {
        let (mut state, mut rx) = make_state();
        type_text(&mut state, "a").await;
        state.handle_action(Action::Newline).await;
        type_text(&mut state, "b").await;

        assert!(rx.try_recv().is_err());
        assert_eq!(state.input.content(), "a\nb");
    }

    #[tokio::test]
    async fn test_submit_while_sending_keeps_text() {
        let (mut state, mut rx) = make_state();
        state.handle_chat_event(ChatEvent::SendStarted);
        type_text(&mut state, "later").await;

        state.handle_action(Action::Submit).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(state.input.content(), "later");
    }

    #[tokio::test]
    async fn test_quit_and_clear_keys() {
        let (mut state, mut rx) = make_state();
        assert!(state.handle_action(Action::Clear).await);
        assert_eq!(rx.try_recv().unwrap(), UiMessage::Clear);
        assert!(!state.handle_action(Action::Interrupt).await);
        assert!(!state.handle_action(Action::Escape).await);
    }

    #[tokio::test]
    async fn test_send_events_round_trip() {
        let (mut state, _rx) = make_state();
        let mut events = state.chat.subscribe();
        state.chat.set_input("ping");

        state.chat.submit_input().await;
        while let Ok(event) = events.try_recv() {
            state.handle_chat_event(event);
        }

        let contents: Vec<&str> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["ping", "PING"]);
        assert!(!state.is_sending);
        assert_eq!(state.chat.input(), "");
    }

    #[tokio::test]
    async fn test_notification_toast_expires() {
        let (mut state, _rx) = make_state();
        state.handle_chat_event(ChatEvent::Notification {
            notification: Notification::error("Connection error with AI"),
        });
        assert!(state.toast.as_ref().is_some_and(|t| t.is_error));

        state.tick(Instant::now());
        assert!(state.toast.is_some());
        state.tick(Instant::now() + Duration::from_secs(60));
        assert!(state.toast.is_none());
    }

    #[tokio::test]
    async fn test_render_welcome_then_messages() {
        let (mut state, _rx) = make_state();
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();

        terminal.draw(|frame| state.render(frame)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("How can I help?"));
        assert!(text.contains("Type a message..."));

        state.handle_chat_event(ChatEvent::MessageAppended {
            message: Message::new("1", Role::User, "hello there", Utc::now()),
        });
        terminal.draw(|frame| state.render(frame)).unwrap();
        let text = screen_text(&terminal);
        assert!(!text.contains("How can I help?"));
        assert!(text.contains("hello there"));
    }

    #[tokio::test]
    async fn test_page_up_leaves_bottom() {
        let (mut state, _rx) = make_state();
        for i in 0..20 {
            state.handle_chat_event(ChatEvent::MessageAppended {
                message: Message::new(i.to_string(), Role::User, format!("message {}", i), Utc::now()),
            });
        }
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal.draw(|frame| state.render(frame)).unwrap();
        assert!(state.max_scroll > PAGE_LINES);

        state.handle_action(Action::PageUp).await;
        assert_eq!(state.scroll, state.max_scroll - PAGE_LINES);

        state.handle_action(Action::PageDown).await;
        assert_eq!(state.scroll, usize::MAX);
    }
}
