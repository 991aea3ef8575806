//! Error types for PageLens.
//!
//! Library crates use [`PageLensError`] via `thiserror`.
//! The app crate (cli) wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all PageLens operations.
#[derive(Debug, thiserror::Error)]
pub enum PageLensError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during page fetch or an outbound API call.
    #[error("network error: {0}")]
    Network(String),

    /// LLM completion error (request, API, or response shape).
    #[error("llm error: {0}")]
    Llm(String),

    /// Enrichment provider error (request, API, or response shape).
    ///
    /// The enrichment client maps these to the sentinel answer at its public
    /// boundary; callers above it never see this variant.
    #[error("enrichment error: {0}")]
    Enrichment(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PageLensError>;

impl PageLensError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
