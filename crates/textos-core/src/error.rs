//! Crate-level error type.

use crate::config::ConfigError;
use crate::document::StoreError;
use crate::search::SearchError;
use thiserror::Error;

/// Any error surfaced by the session layer.
#[derive(Debug, Error)]
pub enum TextosError {
    /// A search query could not be compiled.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Loading or saving a document failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Loading or saving settings failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, TextosError>;
