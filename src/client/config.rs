//! Client configuration

use super::reconnect::ReconnectPolicy;

/// Client configuration options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Signaling server address (`ws://` or `wss://`)
    pub signaling_server: String,

    /// Log each protocol step
    pub debug_logging: bool,

    /// Aggregate consumed tracks into one stream and emit `StreamUpdated`
    pub manage_stream: bool,

    /// Poll the server for the channel's viewer count while consuming
    pub track_viewers: bool,

    /// Restart the session when the control channel closes
    pub auto_reconnect: bool,

    /// Delay applied before a supervisor restart re-watches the channel
    pub reconnect_policy: ReconnectPolicy,
}

impl ClientConfig {
    /// Create a config for the given signaling server with defaults:
    /// stream management and viewer tracking on, debug logging and
    /// auto-reconnect off, immediate reconnection.
    pub fn new(signaling_server: impl Into<String>) -> Self {
        Self {
            signaling_server: signaling_server.into(),
            debug_logging: false,
            manage_stream: true,
            track_viewers: true,
            auto_reconnect: false,
            reconnect_policy: ReconnectPolicy::Immediate,
        }
    }

    /// Enable or disable protocol step logging
    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Enable or disable the aggregated stream
    pub fn manage_stream(mut self, enabled: bool) -> Self {
        self.manage_stream = enabled;
        self
    }

    /// Enable or disable viewer count polling
    pub fn track_viewers(mut self, enabled: bool) -> Self {
        self.track_viewers = enabled;
        self
    }

    /// Enable or disable reconnecting when the control channel closes
    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Set the reconnect policy
    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = policy;
        self
    }
}
