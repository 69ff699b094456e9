//! Error types
//!
//! Errors surfaced by the signaling client. Failures the protocol tolerates
//! (capability load, unknown messages, a lost transport) never reach the
//! caller as an `Error`; they are logged or turned into a reconnect instead.

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a signaling session
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller violated a precondition
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    /// A frame could not be encoded or decoded as a signaling message
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The media-negotiation engine reported a failure
    #[error("Media engine error: {0}")]
    Engine(String),

    /// The control channel's I/O task is gone
    #[error("Control channel closed")]
    ChannelClosed,

    /// The client event loop is no longer running
    #[error("Client stopped")]
    ClientStopped,
}

/// Precondition violations, returned synchronously to the caller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// `watch()` called while a control channel already exists
    #[error("client already watching channel {channel_id}; reset() first")]
    AlreadyWatching {
        /// Channel the live session is bound to
        channel_id: String,
    },

    /// A message was sent before any control channel was opened
    #[error("no control channel; watch() a channel first")]
    NoControlChannel,

    /// `watch()` called outside a tokio runtime
    #[error("watch() must be called from within a tokio runtime")]
    NoRuntime,
}

impl Error {
    /// Create an engine error from anything displayable
    pub fn engine(message: impl std::fmt::Display) -> Self {
        Error::Engine(message.to_string())
    }

    /// Check if this error is a caller precondition violation
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}
