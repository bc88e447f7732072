//! Error types for vesper-chat

use thiserror::Error;

/// Result type alias using vesper-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during chat operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the history store or assistant client
    #[error(transparent)]
    Api(#[from] vesper_api::Error),
}
