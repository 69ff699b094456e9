//! Client events and observers

use tokio::sync::mpsc;

use crate::session::{MediaStream, SessionPhase};

use super::reconnect::ReconnectReason;

/// Events from the signaling client
#[derive(Debug, Clone)]
pub enum ClientEvent<T> {
    /// A consumer produced a new track
    TrackCreated(T),

    /// The aggregated stream gained a track
    StreamUpdated(MediaStream<T>),

    /// Audience size reported by the server
    ViewerCount(u64),

    /// The session moved to a new phase
    StateChanged(SessionPhase),

    /// The supervisor is restarting the session
    Reconnecting {
        channel_id: String,
        reason: ReconnectReason,
    },

    /// Non-fatal failure (transport creation, consume, send)
    Error(String),
}

/// Registered event receivers
///
/// Every observer sees every event, in emission order. Observers whose
/// receiver was dropped are pruned on the next emit.
#[derive(Debug)]
pub(crate) struct Observers<T> {
    senders: Vec<mpsc::UnboundedSender<ClientEvent<T>>>,
}

impl<T: Clone> Observers<T> {
    pub(crate) fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ClientEvent<T>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, event: ClientEvent<T>) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
