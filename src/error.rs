//! Error types for automuse operations.

use thiserror::Error;

/// Primary error type for version-store and export operations.
#[derive(Error, Debug)]
pub enum AmError {
    // Image decoding errors
    #[error("Failed to decode image data: {0}")]
    Decode(String),

    // Version index persistence errors
    #[error("Version index error at {path}: {reason}")]
    Persistence { path: String, reason: String },

    // Export request errors
    #[error("Invalid export input: {0}")]
    InvalidInput(String),

    // External encoder errors
    #[error("Encoder failed: {0}")]
    Encode(String),

    // Web server errors
    #[error("Web server failed to start on {addr}: {reason}")]
    WebServerFailed { addr: String, reason: String },

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AmError {
    /// Short machine-readable kind, used in API error bodies.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_error",
            Self::Persistence { .. } => "persistence_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::Encode(_) => "encode_error",
            Self::WebServerFailed { .. } => "web_server_failed",
            Self::Io(_) => "io_error",
            Self::Other(_) => "error",
        }
    }

    /// Returns true if the error stems from bad caller input rather than
    /// host or store state.
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::InvalidInput(_))
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Decode(_) => Some("Send a base64 data URL of a valid PNG capture"),
            Self::Encode(_) => Some("Ensure ffmpeg is installed and on PATH"),
            Self::WebServerFailed { .. } => Some("Pick a free port with --port"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using AmError.
pub type Result<T> = std::result::Result<T, AmError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| AmError::Other(format!("{}: {e}", f().into())))
    }
}
