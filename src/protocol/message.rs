//! Signaling messages
//!
//! Every frame on the control channel is one JSON object discriminated by a
//! `type` field:
//!
//! ```text
//! Client                                   Server
//!   |------- Begin { channel_id } -------->|
//!   |<------ Init { producers, ... } ------|
//!   |------- Init { rtp_capabilities } --->|
//!   |------- Consume --------------------->|
//!   |------- Connect { dtls_parameters } ->|   (when the transport asks)
//!   |<------ Connected --------------------|
//!   |<------ Consuming { consume[] } ------|
//!   |------- Resume { id } --------------->|   (one per consumer)
//!   |------- PollConnectedViewers -------->|   (every 5s)
//!   |<------ ViewerCount { count } --------|
//! ```
//!
//! Negotiation parameters (capabilities, DTLS, ICE, RTP) belong to the
//! media-negotiation engine and are carried through untouched as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Consumer identifier issued by the server
pub type ConsumerId = String;

/// Producer identifier issued by the server
pub type ProducerId = String;

/// Transport identifier issued by the server
pub type TransportId = String;

macro_rules! opaque_parameters {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub Value);

            impl From<Value> for $name {
                fn from(value: Value) -> Self {
                    Self(value)
                }
            }
        )+
    };
}

opaque_parameters! {
    /// Codec and header-extension capabilities (router or local)
    RtpCapabilities;
    /// DTLS role and fingerprints
    DtlsParameters;
    /// ICE username fragment and password
    IceParameters;
    /// A single ICE candidate
    IceCandidate;
    /// Codec parameters for one consumer
    RtpParameters;
}

/// Media kind of a consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio track
    Audio,
    /// Video track
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Server-issued parameters for the local receive transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    pub id: TransportId,
    pub dtls_parameters: DtlsParameters,
    pub ice_candidates: Vec<IceCandidate>,
    pub ice_parameters: IceParameters,
}

/// One remote producer offered for consumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeDescriptor {
    pub id: ConsumerId,
    pub producer_id: ProducerId,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
}

/// Messages sent from the client to the signaling server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerboundMessage {
    /// Ask to start watching a channel
    Begin { channel_id: String },
    /// Local capabilities, after loading the router's
    Init { rtp_capabilities: RtpCapabilities },
    /// Complete the DTLS handshake of the receive transport
    Connect { dtls_parameters: DtlsParameters },
    /// Turn the producer list into consumers
    Consume,
    /// Unpause a consumer
    Resume { id: ConsumerId },
    /// Ask for the current audience size
    PollConnectedViewers,
}

impl ServerboundMessage {
    /// Encode as a single JSON text frame
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The `type` tag of this message
    pub fn kind(&self) -> &'static str {
        match self {
            ServerboundMessage::Begin { .. } => "Begin",
            ServerboundMessage::Init { .. } => "Init",
            ServerboundMessage::Connect { .. } => "Connect",
            ServerboundMessage::Consume => "Consume",
            ServerboundMessage::Resume { .. } => "Resume",
            ServerboundMessage::PollConnectedViewers => "PollConnectedViewers",
        }
    }
}

/// Messages sent from the signaling server to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientboundMessage {
    /// Producer list, transport descriptor and router capabilities
    Init {
        producers: Vec<ProducerId>,
        transport: TransportOptions,
        router_rtp_capabilities: RtpCapabilities,
    },
    /// The server finished connecting the transport
    Connected,
    /// Consumers created on the server, one per producer
    Consuming { consume: Vec<ConsumeDescriptor> },
    /// Current audience size of the channel
    ViewerCount { count: u64 },
    /// Any `type` this client does not know about
    #[serde(other)]
    Unknown,
}

impl ClientboundMessage {
    /// Decode one JSON text frame
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
