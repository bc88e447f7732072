//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vesper_chat::{CleanupPolicy, Locale};

pub const DEFAULT_HISTORY_URL: &str = "http://localhost:8080/api/history";
pub const DEFAULT_ASSISTANT_URL: &str = "http://localhost:8080/api/chat";

/// Configuration for vesper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversation history resource
    pub history_url: Option<String>,
    /// Assistant endpoint
    pub assistant_url: Option<String>,
    /// Language of notifications and labels
    pub locale: Option<Locale>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Clear the history every night at local midnight
    pub daily_cleanup: bool,
    pub cleanup_policy: CleanupPolicy,
    /// Per-request timeout; unset leaves the HTTP client default
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_url: None,
            assistant_url: None,
            locale: None,
            tui: None,
            daily_cleanup: true,
            cleanup_policy: CleanupPolicy::default(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vesper")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("VESPER_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Where TUI mode writes its log
    pub fn log_path() -> PathBuf {
        Self::config_dir().join("vesper.log")
    }

    /// Load config from the default path
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults with a warning
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            history_url: Some(DEFAULT_HISTORY_URL.to_string()),
            assistant_url: Some(DEFAULT_ASSISTANT_URL.to_string()),
            locale: Some(Locale::En),
            tui: Some(true),
            ..Default::default()
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    pub fn history_url(&self) -> &str {
        self.history_url.as_deref().unwrap_or(DEFAULT_HISTORY_URL)
    }

    pub fn assistant_url(&self) -> &str {
        self.assistant_url.as_deref().unwrap_or(DEFAULT_ASSISTANT_URL)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# vesper configuration file
# Place at ~/.config/vesper/config.toml (Linux), ~/Library/Application Support/vesper/config.toml (Mac)
# or %APPDATA%\vesper\config.toml (Windows). VESPER_CONFIG_PATH overrides the location.

# Conversation history store (GET / POST / DELETE)
history_url = "http://localhost:8080/api/history"

# Assistant endpoint (POST {"message": ...})
assistant_url = "http://localhost:8080/api/chat"

# Notification and label language (en, ru)
locale = "en"

# Whether to use TUI mode by default (true by default)
tui = true

# Clear the whole history every night at local midnight
daily_cleanup = true

# fixed-interval: every 24h after the first midnight (drifts an hour across DST)
# recompute-midnight: look up the next local midnight after every cleanup
cleanup_policy = "fixed-interval"

# Per-request timeout in seconds (optional)
# request_timeout_secs = 60
"#
}
