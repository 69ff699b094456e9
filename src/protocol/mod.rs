//! Signaling protocol
//!
//! Typed messages exchanged over the control channel, in both directions,
//! and decoding of raw channel frames into them.

pub mod frame;
pub mod message;

pub use frame::{decode_frame, Frame};
pub use message::{
    ClientboundMessage, ConsumeDescriptor, ConsumerId, DtlsParameters, IceCandidate,
    IceParameters, MediaKind, ProducerId, RtpCapabilities, RtpParameters, ServerboundMessage,
    TransportId, TransportOptions,
};
