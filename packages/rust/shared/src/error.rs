//! Error types for machine-sync.
//!
//! Library crates use [`SyncError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("GitHub API error: HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// JSON serialization of the output failed.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a decode error from any displayable message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
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

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server refused the request for quota or permission reasons.
    ///
    /// Unauthenticated GitHub API calls answer 403 once the hourly quota is
    /// spent; secondary limits may answer 429.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.status(), Some(403 | 429))
    }
}
