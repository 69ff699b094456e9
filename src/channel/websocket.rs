//! WebSocket control channel
//!
//! Default [`Dialer`] backed by `tokio-tungstenite`. Each dial spawns one
//! task that owns the socket:
//!
//! ```text
//!   ControlChannel ──(mpsc)──► [socket task] ──► ws write
//!                                   │
//!   session queue ◄── ChannelEvents ◄── ws read
//! ```
//!
//! Dropping the [`ControlChannel`] ends the outbound queue, which the task
//! turns into a close frame.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::protocol::Frame;

use super::{ChannelEvents, ControlChannel, Dialer};

/// Dials the signaling server over WebSocket (`ws://` or `wss://`)
///
/// `wss://` uses rustls with the webpki root certificates.
///
/// # Panics
///
/// `dial` spawns the socket task, so it must run inside a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketDialer;

impl Dialer for WebSocketDialer {
    fn dial(&self, url: &str, events: ChannelEvents) -> ControlChannel {
        if url.starts_with("wss:") {
            // Fails harmlessly when the application installed one already
            let _ = rustls::crypto::ring::default_provider().install_default();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_socket(url.to_owned(), events, rx));
        ControlChannel::new(tx, Some(task))
    }
}

async fn run_socket(
    url: String,
    events: ChannelEvents,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "WebSocket connect failed");
            events.closed(Some(e.to_string()));
            return;
        }
    };

    tracing::debug!(url = %url, generation = events.generation(), "WebSocket open");
    events.open();

    let (mut write, mut read) = ws.split();

    let reason = loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text)).await {
                        break Some(e.to_string());
                    }
                }
                None => {
                    // Session dropped the channel
                    let _ = write.send(Message::Close(None)).await;
                    break None;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => events.frame(Frame::Text(text)),
                Some(Ok(Message::Binary(data))) => events.frame(Frame::Binary(data)),
                Some(Ok(Message::Close(frame))) => {
                    break frame.map(|f| f.reason.to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Some(e.to_string()),
                None => break None,
            },
        }
    };

    tracing::debug!(url = %url, reason = ?reason, "WebSocket closed");
    events.closed(reason);
}
