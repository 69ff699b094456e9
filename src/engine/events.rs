//! Transport callbacks
//!
//! Events a receive transport raises towards the session, and the
//! single-use acknowledgement it waits on while DTLS connects.

use tokio::sync::{mpsc, oneshot};

use crate::protocol::DtlsParameters;
use crate::session::SessionEvent;

/// Connection state of a receive transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Failed,
    /// Transport lost; the session rebuilds itself from scratch
    Disconnected,
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::New => "new",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Single-use "the server has connected the transport" continuation
///
/// Created by the transport when it needs DTLS completed. The session holds
/// at most one; a newer request replaces (and drops) the older one, which
/// the waiting side observes as a closed channel.
#[derive(Debug)]
pub struct Acknowledge(oneshot::Sender<()>);

impl Acknowledge {
    /// Create an acknowledgement and the receiver that resolves when it fires
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Signal that the server finished connecting
    pub fn acknowledge(self) {
        let _ = self.0.send(());
    }
}

/// Event raised by a receive transport
#[derive(Debug)]
pub enum TransportEvent {
    /// Transport connection state changed
    ConnectionStateChanged(ConnectionState),

    /// Transport needs the server to complete DTLS
    ConnectNeeded {
        dtls_parameters: DtlsParameters,
        ack: Acknowledge,
    },
}

/// Sink a transport uses to report events to its session
///
/// Events are tagged with the session generation the transport was built
/// for, so a transport outliving its session cannot affect the next one.
#[derive(Debug, Clone)]
pub struct TransportEvents {
    generation: u64,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl TransportEvents {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { generation, tx }
    }

    /// Session generation this sink belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report a connection state change
    pub fn connection_state_changed(&self, state: ConnectionState) {
        self.emit(TransportEvent::ConnectionStateChanged(state));
    }

    /// Ask the session to send `Connect` and wait for `Connected`
    pub fn connect_needed(&self, dtls_parameters: DtlsParameters, ack: Acknowledge) {
        self.emit(TransportEvent::ConnectNeeded {
            dtls_parameters,
            ack,
        });
    }

    fn emit(&self, event: TransportEvent) {
        // Client gone: nothing left to notify
        let _ = self.tx.send(SessionEvent::Transport {
            generation: self.generation,
            event,
        });
    }
}
