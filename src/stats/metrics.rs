//! Statistics for signaling sessions

use std::time::Duration;

/// Client-level statistics
///
/// Counters are cumulative across reconnects; `duration` and
/// `active_duration` describe the current session only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Signaling messages sent
    pub messages_sent: u64,
    /// Frames received on the control channel
    pub frames_received: u64,
    /// Frames dropped (binary, malformed or unknown type)
    pub frames_ignored: u64,
    /// Tracks created from consumers
    pub tracks_created: u64,
    /// Sessions torn down and restarted by the supervisor
    pub reconnects: u64,
    /// Last audience size reported by the server
    pub viewer_count: Option<u64>,
    /// Time since the current session was started
    pub duration: Duration,
    /// Time since the current session started consuming
    pub active_duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }
}
