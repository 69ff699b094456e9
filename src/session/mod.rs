//! Signaling session
//!
//! One session per `watch()` call: the control channel, the receive
//! transport, the aggregated stream and the viewer poll timer, plus the
//! phase they have reached.
//!
//! # Event queue
//!
//! Every asynchronous source feeds the client's single queue with a
//! [`SessionEvent`] tagged by the generation it was created for:
//!
//! ```text
//!   control channel task ──┐
//!   transport callbacks  ──┼──► mpsc ──► Client::run() ──► one event at a time
//!   viewer poll timer    ──┤
//!   ClientHandle         ──┘
//! ```
//!
//! Consume results travel on a second, typed queue from the session's
//! [`ConsumeWorker`], tagged the same way.
//!
//! `watch()` and `reset()` bump the generation, so anything still in flight
//! for a torn-down session is dropped on arrival.

pub mod consumer;
pub mod poller;
pub mod state;
pub mod stream;

use crate::channel::ChannelEvent;
use crate::client::handle::Command;
use crate::engine::TransportEvent;

pub(crate) use consumer::Consumed;
pub use consumer::ConsumeWorker;
pub use poller::{ViewerPoller, VIEWER_POLL_INTERVAL};
pub use state::{ConsumerInfo, SessionPhase, SessionState};
pub use stream::{MediaStream, StreamId, StreamTrack};

/// Event delivered to the client's queue
#[derive(Debug)]
pub(crate) enum SessionEvent {
    /// From the control channel
    Channel { generation: u64, event: ChannelEvent },

    /// From the receive transport
    Transport {
        generation: u64,
        event: TransportEvent,
    },

    /// Viewer poll timer fired
    PollTick { generation: u64 },

    /// Delayed re-watch after a backoff
    Rewatch { generation: u64, channel_id: String },

    /// From a [`ClientHandle`](crate::client::ClientHandle)
    Command(Command),
}

impl SessionEvent {
    /// Generation the event belongs to; commands always apply
    pub(crate) fn generation(&self) -> Option<u64> {
        match self {
            SessionEvent::Channel { generation, .. }
            | SessionEvent::Transport { generation, .. }
            | SessionEvent::PollTick { generation }
            | SessionEvent::Rewatch { generation, .. } => Some(*generation),
            SessionEvent::Command(_) => None,
        }
    }
}
