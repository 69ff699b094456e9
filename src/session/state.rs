//! Session state machine
//!
//! Tracks one watch session from `watch()` to `reset()`, and owns every
//! resource tied to it.

use std::time::{Duration, Instant};

use crate::channel::ControlChannel;
use crate::engine::Acknowledge;
use crate::protocol::{ConsumerId, MediaKind, ProducerId};

use super::consumer::ConsumeWorker;
use super::poller::ViewerPoller;
use super::stream::MediaStream;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Never watched
    Idle,
    /// Control channel dialed, not open yet
    Connecting,
    /// `Begin` sent, waiting for the server's `Init`
    AwaitingCapabilities,
    /// Receive transport built, `Consume` sent
    TransportReady,
    /// First `Consuming` batch received
    Consuming,
    /// Torn down by `reset()`
    Closed,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Connecting => "connecting",
            SessionPhase::AwaitingCapabilities => "awaiting-capabilities",
            SessionPhase::TransportReady => "transport-ready",
            SessionPhase::Consuming => "consuming",
            SessionPhase::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// A consumer the session has instantiated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerInfo {
    pub id: ConsumerId,
    pub producer_id: ProducerId,
    pub kind: MediaKind,
}

/// Complete session state, generic over the track type
///
/// Invariant: at most one control channel and one receive transport are
/// held at a time. `reset()` drops all of them together.
#[derive(Debug)]
pub struct SessionState<T> {
    /// Bumped on every `begin` and `reset`
    generation: u64,

    /// Current phase
    phase: SessionPhase,

    /// Channel being watched
    channel_id: Option<String>,

    /// Control channel to the signaling server
    channel: Option<ControlChannel>,

    /// Local receive transport, owned by its consume worker
    transport: Option<ConsumeWorker>,

    /// Tracks aggregated so far
    stream: Option<MediaStream<T>>,

    /// Viewer count poll timer
    poller: Option<ViewerPoller>,

    /// Outstanding DTLS connect acknowledgement
    pending_ack: Option<Acknowledge>,

    /// Consumers instantiated, in order
    consumers: Vec<ConsumerInfo>,

    /// When `watch()` started this session
    started_at: Option<Instant>,

    /// When the first `Consuming` batch arrived
    activated_at: Option<Instant>,
}

impl<T> SessionState<T> {
    /// Create an idle session
    pub fn new() -> Self {
        Self {
            generation: 0,
            phase: SessionPhase::Idle,
            channel_id: None,
            channel: None,
            transport: None,
            stream: None,
            poller: None,
            pending_ack: None,
            consumers: Vec::new(),
            started_at: None,
            activated_at: None,
        }
    }

    /// Start a new session for `channel_id` and return its generation.
    ///
    /// The caller checks that no control channel exists.
    pub fn begin(&mut self, channel_id: String) -> u64 {
        debug_assert!(self.channel.is_none());
        self.generation += 1;
        self.channel_id = Some(channel_id);
        self.phase = SessionPhase::Connecting;
        self.started_at = Some(Instant::now());
        self.activated_at = None;
        self.generation
    }

    /// Store the control channel dialed for this session
    pub fn attach_channel(&mut self, channel: ControlChannel) {
        self.channel = Some(channel);
    }

    /// Control channel opened
    ///
    /// Returns `false` if the session was not waiting for it.
    pub fn on_open(&mut self) -> bool {
        if self.phase == SessionPhase::Connecting {
            self.phase = SessionPhase::AwaitingCapabilities;
            true
        } else {
            false
        }
    }

    /// Store the worker owning the receive transport built from the
    /// server's `Init`
    pub fn attach_transport(&mut self, transport: ConsumeWorker) {
        debug_assert!(self.transport.is_none());
        self.transport = Some(transport);
        self.phase = SessionPhase::TransportReady;
    }

    /// Enter the active consuming phase
    ///
    /// Returns `true` only on the first call of a session.
    pub fn activate(&mut self) -> bool {
        if self.phase == SessionPhase::TransportReady {
            self.phase = SessionPhase::Consuming;
            self.activated_at = Some(Instant::now());
            true
        } else {
            false
        }
    }

    /// Append a consumed track to the aggregated stream, creating it on
    /// first use
    pub fn add_track(&mut self, consumer: &ConsumerInfo, track: T) -> &MediaStream<T> {
        let stream = self.stream.get_or_insert_with(MediaStream::new);
        stream.add_track(consumer.id.clone(), consumer.kind, track);
        stream
    }

    /// Record an instantiated consumer
    pub fn record_consumer(&mut self, consumer: ConsumerInfo) {
        self.consumers.push(consumer);
    }

    /// Store the DTLS acknowledgement, replacing any older one
    ///
    /// Returns `true` if an older acknowledgement was dropped.
    pub fn replace_pending_ack(&mut self, ack: Acknowledge) -> bool {
        self.pending_ack.replace(ack).is_some()
    }

    /// Take the DTLS acknowledgement, if any
    pub fn take_pending_ack(&mut self) -> Option<Acknowledge> {
        self.pending_ack.take()
    }

    /// Store the viewer poll timer
    pub fn start_poller(&mut self, poller: ViewerPoller) {
        self.poller = Some(poller);
    }

    /// Tear the session down
    ///
    /// Drops the channel (closing it), the transport, the stream, the
    /// poll timer and any pending acknowledgement.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = SessionPhase::Closed;
        self.channel_id = None;
        self.channel = None;
        self.transport = None;
        self.stream = None;
        self.poller = None;
        self.pending_ack = None;
        self.consumers.clear();
        self.started_at = None;
        self.activated_at = None;
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Channel being watched
    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    /// Get the control channel
    pub fn channel(&self) -> Option<&ControlChannel> {
        self.channel.as_ref()
    }

    /// Check if a control channel exists
    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    /// Check if a receive transport exists
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Get the consume worker
    pub fn consume_worker(&self) -> Option<&ConsumeWorker> {
        self.transport.as_ref()
    }

    /// Get the aggregated stream
    pub fn stream(&self) -> Option<&MediaStream<T>> {
        self.stream.as_ref()
    }

    /// Consumers instantiated so far
    pub fn consumers(&self) -> &[ConsumerInfo] {
        &self.consumers
    }

    /// Check if a DTLS acknowledgement is outstanding
    pub fn has_pending_ack(&self) -> bool {
        self.pending_ack.is_some()
    }

    /// Check if the viewer poll timer is running
    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// Check if the session is consuming media
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Consuming
    }

    /// Time since `watch()` started this session
    pub fn duration(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    /// Time since the first `Consuming` batch
    pub fn active_duration(&self) -> Option<Duration> {
        self.activated_at.map(|t| t.elapsed())
    }
}

impl<T> Default for SessionState<T> {
    fn default() -> Self {
        Self::new()
    }
}
