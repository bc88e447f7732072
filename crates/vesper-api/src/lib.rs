//! vesper-api: wire types and HTTP clients
//!
//! This crate talks to the two remote services behind the chat: the
//! conversation history store and the assistant endpoint. It also provides
//! the placeholder filter applied to assistant replies.

pub mod assistant;
pub mod error;
pub mod filter;
pub mod history;
pub mod http;
pub mod types;

pub use assistant::{Assistant, AssistantClient};
pub use error::{Error, Result};
pub use filter::filter;
pub use history::{HistoryClient, HistoryStore};
pub use types::*;
