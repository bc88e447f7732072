//! User-facing strings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of notifications and UI labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    pub fn history_cleared(&self) -> &'static str {
        match self {
            Locale::En => "History cleared",
            Locale::Ru => "История очищена",
        }
    }

    pub fn clear_failed(&self) -> &'static str {
        match self {
            Locale::En => "Failed to clear history",
            Locale::Ru => "Не удалось очистить историю",
        }
    }

    /// "Error: <detail>", falling back to a generic "no response" text
    pub fn assistant_error(&self, detail: Option<&str>) -> String {
        let detail = detail.unwrap_or(match self {
            Locale::En => "Failed to get a response",
            Locale::Ru => "Не удалось получить ответ",
        });
        match self {
            Locale::En => format!("Error: {}", detail),
            Locale::Ru => format!("Ошибка: {}", detail),
        }
    }

    pub fn connection_error(&self) -> &'static str {
        match self {
            Locale::En => "Connection error with AI",
            Locale::Ru => "Ошибка соединения с AI",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Locale::En => "AI Assistant",
            Locale::Ru => "AI Ассистент",
        }
    }

    pub fn welcome(&self) -> &'static str {
        match self {
            Locale::En => "How can I help?",
            Locale::Ru => "Чем могу помочь?",
        }
    }

    pub fn welcome_hint(&self) -> &'static str {
        match self {
            Locale::En => "Ask a question or start a conversation with the AI assistant",
            Locale::Ru => "Задайте вопрос или начните диалог с AI-ассистентом",
        }
    }

    pub fn input_placeholder(&self) -> &'static str {
        match self {
            Locale::En => "Type a message...",
            Locale::Ru => "Напишите сообщение...",
        }
    }

    pub fn key_hint(&self) -> &'static str {
        match self {
            Locale::En => "Enter: send │ Shift+Enter: new line │ Ctrl+L: clear │ Ctrl+C: quit",
            Locale::Ru => "Enter: отправить │ Shift+Enter: новая строка │ Ctrl+L: очистить │ Ctrl+C: выход",
        }
    }

    pub fn user_label(&self) -> &'static str {
        match self {
            Locale::En => "You",
            Locale::Ru => "Вы",
        }
    }

    pub fn assistant_label(&self) -> &'static str {
        match self {
            Locale::En => "Assistant",
            Locale::Ru => "Ассистент",
        }
    }

    /// Status while waiting on the assistant
    pub fn thinking(&self) -> &'static str {
        match self {
            Locale::En => "Thinking...",
            Locale::Ru => "Думаю...",
        }
    }

    pub fn ready(&self) -> &'static str {
        match self {
            Locale::En => "Ready",
            Locale::Ru => "Готово",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "ru" | "russian" => Ok(Locale::Ru),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}
