//! vesper-tui: terminal widgets
//!
//! Key mapping, theme and the widgets the chat screen is built from,
//! on top of ratatui and crossterm.

pub mod input;
pub mod theme;
pub mod widgets;

pub use input::Action;
pub use theme::Theme;
