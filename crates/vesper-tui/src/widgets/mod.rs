//! Custom widgets for the TUI

pub mod input_box;
pub mod message_list;
pub mod status_bar;
pub mod toast;

pub use input_box::InputBox;
pub use message_list::{MessageList, RoleLabels};
pub use status_bar::StatusBar;
pub use toast::Toast;
