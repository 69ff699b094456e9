//! In-memory collaborators for driving a client without a network

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::mpsc;

use crate::channel::{ChannelEvents, ControlChannel, Dialer};
use crate::engine::{Acknowledge, Consumer, MediaEngine, ReceiveTransport, TransportEvents};
use crate::error::{Error, Result};
use crate::protocol::{
    ClientboundMessage, ConsumeDescriptor, Frame, MediaKind, RtpCapabilities,
    ServerboundMessage, TransportOptions,
};
use crate::session::ConsumerInfo;

/// Route `tracing` output to the test harness; `RUST_LOG` selects levels
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Server side of one dialed control channel
#[derive(Debug, Clone)]
pub(crate) struct ServerEnd {
    pub url: String,
    events: ChannelEvents,
    outbound: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
}

impl ServerEnd {
    pub fn open(&self) {
        self.events.open();
    }

    pub fn push(&self, message: &ClientboundMessage) {
        let text = serde_json::to_string(message).unwrap();
        self.events.frame(Frame::Text(text));
    }

    pub fn push_frame(&self, frame: Frame) {
        self.events.frame(frame);
    }

    pub fn close(&self) {
        self.events.closed(Some("server went away".into()));
    }

    /// Drop the server's read side, as if the connection died
    pub fn hang_up(&self) {
        let (_, rx) = mpsc::unbounded_channel();
        *self.outbound.lock().unwrap() = rx;
    }

    /// Messages the client sent since the last call
    pub fn received(&self) -> Vec<ServerboundMessage> {
        let mut outbound = self.outbound.lock().unwrap();
        let mut messages = Vec::new();
        while let Ok(text) = outbound.try_recv() {
            messages.push(serde_json::from_str(&text).unwrap());
        }
        messages
    }
}

/// Dialer that records every channel instead of connecting
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryDialer {
    servers: Arc<Mutex<Vec<ServerEnd>>>,
}

impl MemoryDialer {
    pub fn dials(&self) -> usize {
        self.servers.lock().unwrap().len()
    }

    /// The most recently dialed channel
    pub fn last(&self) -> ServerEnd {
        self.servers.lock().unwrap().last().cloned().unwrap()
    }
}

impl Dialer for MemoryDialer {
    fn dial(&self, url: &str, events: ChannelEvents) -> ControlChannel {
        let (tx, rx) = mpsc::unbounded_channel();
        self.servers.lock().unwrap().push(ServerEnd {
            url: url.to_owned(),
            events,
            outbound: Arc::new(Mutex::new(rx)),
        });
        ControlChannel::new(tx, None)
    }
}

/// Stand-in for a real track
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeTrack {
    pub consumer_id: String,
    pub kind: MediaKind,
}

impl From<ConsumerInfo> for FakeTrack {
    fn from(info: ConsumerInfo) -> Self {
        Self {
            consumer_id: info.id,
            kind: info.kind,
        }
    }
}

/// Knobs and recordings shared by a [`FakeEngine`] and its transports
#[derive(Debug, Default)]
pub(crate) struct EngineScript {
    pub fail_load: bool,
    pub fail_transport: bool,
    pub fail_consume: HashSet<String>,
    /// First `consume` asks for DTLS and waits for `Connected`
    pub connect_on_consume: bool,
    pub loaded: Option<RtpCapabilities>,
    pub loads: usize,
    pub transports: Vec<TransportEvents>,
    pub consumed: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeEngine {
    pub script: Arc<Mutex<EngineScript>>,
}

impl FakeEngine {
    pub fn set(&self, f: impl FnOnce(&mut EngineScript)) {
        f(&mut self.script.lock().unwrap());
    }

    pub fn loads(&self) -> usize {
        self.script.lock().unwrap().loads
    }

    pub fn consumed(&self) -> Vec<String> {
        self.script.lock().unwrap().consumed.clone()
    }

    pub fn transports(&self) -> usize {
        self.script.lock().unwrap().transports.len()
    }

    /// Event sink of the most recently created transport
    pub fn transport_events(&self) -> TransportEvents {
        self.script.lock().unwrap().transports.last().cloned().unwrap()
    }
}

impl MediaEngine for FakeEngine {
    type Transport = FakeTransport;

    async fn load(&mut self, router_rtp_capabilities: &RtpCapabilities) -> Result<()> {
        let mut script = self.script.lock().unwrap();
        script.loads += 1;
        if script.fail_load {
            return Err(Error::engine("unsupported router capabilities"));
        }
        script.loaded = Some(router_rtp_capabilities.clone());
        Ok(())
    }

    fn rtp_capabilities(&self) -> RtpCapabilities {
        RtpCapabilities(json!({ "codecs": [{ "mimeType": "video/VP8" }] }))
    }

    fn create_receive_transport(
        &mut self,
        options: &TransportOptions,
        events: TransportEvents,
    ) -> Result<FakeTransport> {
        let mut script = self.script.lock().unwrap();
        if script.fail_transport {
            return Err(Error::engine("bad transport descriptor"));
        }
        script.transports.push(events.clone());
        Ok(FakeTransport {
            id: options.id.clone(),
            events: Some(events),
            connected: false,
            script: self.script.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    pub id: String,
    events: Option<TransportEvents>,
    connected: bool,
    script: Arc<Mutex<EngineScript>>,
}

impl ReceiveTransport for FakeTransport {
    type Track = FakeTrack;

    async fn consume(&mut self, descriptor: &ConsumeDescriptor) -> Result<Consumer<FakeTrack>> {
        let connect = !self.connected && self.script.lock().unwrap().connect_on_consume;
        if connect {
            let (ack, connected) = Acknowledge::new();
            if let Some(events) = &self.events {
                events.connect_needed(json!({ "role": "client" }).into(), ack);
            }
            connected
                .await
                .map_err(|_| Error::engine("transport closed before connecting"))?;
            self.connected = true;
        }

        let mut script = self.script.lock().unwrap();
        if script.fail_consume.contains(&descriptor.id) {
            return Err(Error::engine(format!("cannot consume {}", descriptor.id)));
        }
        script.consumed.push(descriptor.id.clone());

        Ok(Consumer {
            id: descriptor.id.clone(),
            kind: descriptor.kind,
            track: FakeTrack {
                consumer_id: descriptor.id.clone(),
                kind: descriptor.kind,
            },
        })
    }
}

/// Server `Init` announcing `producers`
pub(crate) fn init_message(producers: &[&str]) -> ClientboundMessage {
    ClientboundMessage::Init {
        producers: producers.iter().map(|p| p.to_string()).collect(),
        transport: TransportOptions {
            id: "t1".into(),
            dtls_parameters: json!({ "role": "auto" }).into(),
            ice_candidates: vec![json!({ "ip": "10.0.0.1", "port": 40000 }).into()],
            ice_parameters: json!({ "usernameFragment": "u", "password": "p" }).into(),
        },
        router_rtp_capabilities: json!({ "codecs": [] }).into(),
    }
}

/// Server `Consuming` with one descriptor per `(consumer, producer, kind)`
pub(crate) fn consuming_message(consumers: &[(&str, &str, MediaKind)]) -> ClientboundMessage {
    ClientboundMessage::Consuming {
        consume: consumers
            .iter()
            .map(|(id, producer_id, kind)| descriptor(id, producer_id, *kind))
            .collect(),
    }
}

pub(crate) fn descriptor(id: &str, producer_id: &str, kind: MediaKind) -> ConsumeDescriptor {
    ConsumeDescriptor {
        id: id.into(),
        producer_id: producer_id.into(),
        kind,
        rtp_parameters: json!({ "codecs": [] }).into(),
    }
}
