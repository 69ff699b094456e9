//! Signaling client
//!
//! Watches a live channel: opens the control channel, negotiates a receive
//! transport through the application's media engine, consumes every
//! producer and keeps the session alive.
//!
//! ```text
//!  watch(id) ─► Connecting ─open─► AwaitingCapabilities ─Init─► TransportReady
//!                                                                    │
//!                    reset() / reconnect ◄─── Consuming ◄─Consuming──┘
//! ```

pub mod config;
pub mod events;
pub(crate) mod handle;
pub mod reconnect;
pub mod viewer;

pub use config::ClientConfig;
pub use events::ClientEvent;
pub use handle::ClientHandle;
pub use reconnect::{ReconnectPolicy, ReconnectReason, ReconnectSupervisor};
pub use viewer::Client;
