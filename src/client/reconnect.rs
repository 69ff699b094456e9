//! Reconnection supervisor
//!
//! Two failure detectors lead to the same recovery: reset the session and
//! watch the same channel again.
//!
//! | trigger                         | reconnects when          |
//! |---------------------------------|--------------------------|
//! | control channel closed          | `auto_reconnect` is set  |
//! | transport state `disconnected`  | always                   |
//!
//! With [`ReconnectPolicy::Immediate`] there is no backoff and no retry
//! limit: an unreachable server is redialed as fast as it refuses.

use std::time::Duration;

/// How soon the supervisor re-watches after a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Re-watch right away
    #[default]
    Immediate,

    /// Re-watch after a delay doubling from `initial` up to `max`.
    /// Back to `initial` once a session reaches the consuming phase.
    Backoff { initial: Duration, max: Duration },
}

/// What made the supervisor restart the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectReason {
    /// The control channel closed
    ChannelClosed,
    /// The receive transport reported `disconnected`
    TransportDisconnected,
}

impl std::fmt::Display for ReconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconnectReason::ChannelClosed => write!(f, "control channel closed"),
            ReconnectReason::TransportDisconnected => write!(f, "transport disconnected"),
        }
    }
}

/// Decides whether and when to restart a session
#[derive(Debug, Clone)]
pub struct ReconnectSupervisor {
    policy: ReconnectPolicy,
    auto_reconnect: bool,
    next_delay: Option<Duration>,
    attempts: u64,
}

impl ReconnectSupervisor {
    /// Create a supervisor
    pub fn new(policy: ReconnectPolicy, auto_reconnect: bool) -> Self {
        Self {
            policy,
            auto_reconnect,
            next_delay: None,
            attempts: 0,
        }
    }

    /// Check if `reason` should restart the session
    pub fn should_reconnect(&self, reason: ReconnectReason) -> bool {
        match reason {
            ReconnectReason::ChannelClosed => self.auto_reconnect,
            ReconnectReason::TransportDisconnected => true,
        }
    }

    /// Record a restart and return how long to wait before re-watching.
    ///
    /// `None` means re-watch immediately.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempts += 1;

        match self.policy {
            ReconnectPolicy::Immediate => None,
            ReconnectPolicy::Backoff { initial, max } => {
                let delay = self.next_delay.unwrap_or(initial).min(max);
                self.next_delay = Some(delay.saturating_mul(2).min(max));
                Some(delay)
            }
        }
    }

    /// A session reached the consuming phase
    pub fn on_active(&mut self) {
        self.next_delay = None;
    }

    /// Restarts since the client was created
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}
