//! Control channel frames
//!
//! The signaling protocol only speaks text frames. Binary frames are passed
//! up by the transport but carry nothing this protocol understands.

use crate::error::Result;

use super::message::ClientboundMessage;

/// A single message-boundary frame from the control channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame
    Text(String),
    /// Binary frame
    Binary(Vec<u8>),
}

impl Frame {
    /// Length of the frame payload in bytes
    pub fn len(&self) -> usize {
        match self {
            Frame::Text(text) => text.len(),
            Frame::Binary(data) => data.len(),
        }
    }

    /// Check if the frame payload is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode an inbound frame
///
/// Returns `Ok(None)` for binary frames, which this protocol ignores.
/// A text frame with an unrecognized `type` decodes to
/// [`ClientboundMessage::Unknown`].
pub fn decode_frame(frame: &Frame) -> Result<Option<ClientboundMessage>> {
    match frame {
        Frame::Text(text) => ClientboundMessage::decode(text).map(Some),
        Frame::Binary(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_frame_ignored() {
        let frame = Frame::Binary(vec![0x7b, 0x7d]);
        assert!(decode_frame(&frame).unwrap().is_none());
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn test_text_frame_decoded() {
        let frame = Frame::Text(r#"{"type":"Connected"}"#.into());
        assert_eq!(
            decode_frame(&frame).unwrap(),
            Some(ClientboundMessage::Connected)
        );
    }

    #[test]
    fn test_malformed_text_frame() {
        let frame = Frame::Text("{".into());
        assert!(decode_frame(&frame).is_err());
        assert!(!frame.is_empty());
    }
}
