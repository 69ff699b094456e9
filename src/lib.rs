//! Signaling client for watching WebRTC broadcasts
//!
//! A viewer opens a WebSocket control channel to the signaling server,
//! learns the channel's producers and the router's capabilities, builds a
//! receive transport through a pluggable media engine and consumes every
//! producer. Consumed tracks are aggregated into one stream per session.
//!
//! ```text
//!             control channel (JSON text frames)
//!   Client ◄──────────────────────────────────────► signaling server
//!     │
//!     ├── MediaEngine ── ReceiveTransport ── tracks ──► MediaStream
//!     ├── ViewerPoller (PollConnectedViewers every 5s)
//!     └── ReconnectSupervisor (reset + watch on loss)
//! ```
//!
//! The WebRTC stack itself is not part of this crate: implement
//! [`engine::MediaEngine`] on top of one.
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//!
//! use hyperspeed_rs::client::{Client, ClientConfig, ReconnectPolicy};
//! use hyperspeed_rs::engine::MediaEngine;
//!
//! # async fn example<E: MediaEngine>(engine: E) -> hyperspeed_rs::error::Result<()> {
//! let config = ClientConfig::new("wss://signal.example.com")
//!     .auto_reconnect(true)
//!     .reconnect_policy(ReconnectPolicy::Backoff {
//!         initial: Duration::from_millis(500),
//!         max: Duration::from_secs(30),
//!     });
//!
//! let (handle, task) = Client::new(config, engine).spawn();
//! handle.watch("my-channel").await?;
//!
//! // ... later
//! handle.shutdown()?;
//! let _ = task.await;
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod client;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod session;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Client, ClientConfig, ClientEvent, ClientHandle};
pub use error::{Error, Result, UsageError};
