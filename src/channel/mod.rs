//! Control channel
//!
//! The message-oriented connection to the signaling server. A [`Dialer`]
//! opens one per `watch()`; it reports what happens on the wire through
//! [`ChannelEvents`] and accepts outbound text frames through the returned
//! [`ControlChannel`].

pub mod websocket;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::protocol::Frame;
use crate::session::SessionEvent;

pub use websocket::WebSocketDialer;

/// Something that happened on a control channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel is open and ready for messages
    Open,
    /// A frame arrived
    Frame(Frame),
    /// The channel closed or failed to open. Reported once.
    Closed { reason: Option<String> },
}

/// Sink a channel uses to report events to its session
#[derive(Debug, Clone)]
pub struct ChannelEvents {
    generation: u64,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelEvents {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { generation, tx }
    }

    /// Session generation this channel was opened for
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report the channel as open
    pub fn open(&self) {
        self.emit(ChannelEvent::Open);
    }

    /// Report an inbound frame
    pub fn frame(&self, frame: Frame) {
        self.emit(ChannelEvent::Frame(frame));
    }

    /// Report the channel as closed
    pub fn closed(&self, reason: Option<String>) {
        self.emit(ChannelEvent::Closed { reason });
    }

    fn emit(&self, event: ChannelEvent) {
        let _ = self.tx.send(SessionEvent::Channel {
            generation: self.generation,
            event,
        });
    }
}

/// Handle to an open (or opening) control channel
///
/// Dropping the handle closes the channel.
#[derive(Debug)]
pub struct ControlChannel {
    outbound: mpsc::UnboundedSender<String>,
    task: Option<JoinHandle<()>>,
}

impl ControlChannel {
    /// Wrap an outbound frame queue and the I/O task draining it, if any
    pub fn new(outbound: mpsc::UnboundedSender<String>, task: Option<JoinHandle<()>>) -> Self {
        Self { outbound, task }
    }

    /// Queue a text frame for sending
    pub fn send_text(&self, text: String) -> Result<()> {
        self.outbound.send(text).map_err(|_| Error::ChannelClosed)
    }

    /// Check if the I/O side of the channel has gone away
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed() || self.task.as_ref().is_some_and(|t| t.is_finished())
    }
}

/// Opens control channels to the signaling server
pub trait Dialer: Send + 'static {
    /// Start connecting to `url`.
    ///
    /// Must not block: the returned handle accepts frames immediately and
    /// `events.open()` fires once the connection is usable.
    fn dial(&self, url: &str, events: ChannelEvents) -> ControlChannel;
}
