//! Media-negotiation engine seam
//!
//! The WebRTC stack that actually loads codecs, builds the receive transport
//! and consumes remote producers lives outside this crate. Applications plug
//! it in by implementing [`MediaEngine`] and [`ReceiveTransport`].
//!
//! The transport reports back asynchronously through the [`TransportEvents`]
//! sink it is handed at creation:
//!
//! ```text
//!  MediaEngine::create_receive_transport(options, events)
//!                                            │
//!      ReceiveTransport ── events.connection_state_changed(state) ──► session
//!                       ── events.connect_needed(dtls, ack) ────────► session
//!                                                                       │
//!                       ◄──────────── ack.acknowledge() on `Connected` ─┘
//! ```

pub mod events;

use std::future::Future;

use crate::error::Result;
use crate::protocol::{
    ConsumeDescriptor, ConsumerId, MediaKind, RtpCapabilities, TransportOptions,
};

pub use events::{Acknowledge, ConnectionState, TransportEvent, TransportEvents};

/// A consumer instantiated locally from a [`ConsumeDescriptor`]
#[derive(Debug, Clone)]
pub struct Consumer<T> {
    /// Consumer identifier (echoed back in `Resume`)
    pub id: ConsumerId,

    /// Media kind of the track
    pub kind: MediaKind,

    /// The playable track
    pub track: T,
}

/// Local media-negotiation engine (the "device")
pub trait MediaEngine: Send + 'static {
    /// Receive transport produced by this engine
    type Transport: ReceiveTransport;

    /// Load the router's capabilities into the engine.
    ///
    /// Failure is tolerated by the session: negotiation continues with
    /// whatever state the engine retains.
    fn load(
        &mut self,
        router_rtp_capabilities: &RtpCapabilities,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Local capabilities to announce in the client `Init` message
    fn rtp_capabilities(&self) -> RtpCapabilities;

    /// Build the receive transport from the server's descriptor.
    ///
    /// The transport must report state changes and DTLS connect requests
    /// through `events`.
    fn create_receive_transport(
        &mut self,
        options: &TransportOptions,
        events: TransportEvents,
    ) -> Result<Self::Transport>;
}

/// Local receive transport handle
pub trait ReceiveTransport: Send + 'static {
    /// Track type yielded by consumers
    type Track: Clone + Send + Sync + std::fmt::Debug + 'static;

    /// Instantiate a consumer for one remote producer
    fn consume(
        &mut self,
        descriptor: &ConsumeDescriptor,
    ) -> impl Future<Output = Result<Consumer<Self::Track>>> + Send;
}

/// Track type produced by an engine's transport
pub type TrackOf<E> = <<E as MediaEngine>::Transport as ReceiveTransport>::Track;
