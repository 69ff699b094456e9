//! Channel viewer
//!
//! High-level API for watching a live channel: drives the signaling session
//! from `watch()` to consuming media, aggregates the consumed tracks and
//! restarts the session when it dies.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::channel::{ChannelEvent, ChannelEvents, Dialer, WebSocketDialer};
use crate::engine::{ConnectionState, MediaEngine, TrackOf, TransportEvent, TransportEvents};
use crate::error::{Result, UsageError};
use crate::protocol::{
    decode_frame, ClientboundMessage, ConsumeDescriptor, Frame, ProducerId, RtpCapabilities,
    ServerboundMessage, TransportOptions,
};
use crate::session::{
    ConsumeWorker, Consumed, ConsumerInfo, MediaStream, SessionEvent, SessionPhase,
    SessionState, ViewerPoller, VIEWER_POLL_INTERVAL,
};
use crate::stats::SessionStats;

use super::config::ClientConfig;
use super::events::{ClientEvent, Observers};
use super::handle::{ClientHandle, Command};
use super::reconnect::{ReconnectReason, ReconnectSupervisor};

/// Protocol step logging, only when `debug_logging` is set
macro_rules! verbose {
    ($config:expr, $level:ident, $($arg:tt)+) => {
        if $config.debug_logging {
            tracing::$level!($($arg)+);
        }
    };
}

/// Signaling client for watching one channel at a time
///
/// Events are handled one at a time by [`run`](Client::run). Capability
/// loading is awaited inline; consumers are instantiated by the session's
/// [`ConsumeWorker`] so the DTLS `Connect`/`Connected` exchange they may
/// wait on keeps flowing.
///
/// # Example
/// ```no_run
/// use hyperspeed_rs::client::{Client, ClientConfig, ClientEvent};
/// use hyperspeed_rs::engine::MediaEngine;
///
/// # async fn example<E: MediaEngine>(engine: E) -> hyperspeed_rs::error::Result<()> {
/// let config = ClientConfig::new("wss://signal.example.com");
/// let mut client = Client::new(config, engine);
/// let mut events = client.subscribe();
///
/// tokio::spawn(async move {
///     while let Some(event) = events.recv().await {
///         if let ClientEvent::StreamUpdated(stream) = event {
///             println!("stream now has {} tracks", stream.len());
///         }
///     }
/// });
///
/// client.watch("my-channel")?;
/// client.run().await;
/// # Ok(())
/// # }
/// ```
pub struct Client<E: MediaEngine, D: Dialer = WebSocketDialer> {
    config: ClientConfig,
    engine: E,
    dialer: D,
    session: SessionState<TrackOf<E>>,
    supervisor: ReconnectSupervisor,
    observers: Observers<TrackOf<E>>,
    stats: SessionStats,
    rewatch: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    consumed_tx: mpsc::UnboundedSender<Consumed<TrackOf<E>>>,
    consumed_rx: mpsc::UnboundedReceiver<Consumed<TrackOf<E>>>,
}

impl<E: MediaEngine> Client<E> {
    /// Create a client that dials the signaling server over WebSocket
    pub fn new(config: ClientConfig, engine: E) -> Self {
        Self::with_dialer(config, engine, WebSocketDialer)
    }
}

impl<E: MediaEngine, D: Dialer> Client<E, D> {
    /// Create a client with a custom control channel dialer
    pub fn with_dialer(config: ClientConfig, engine: E, dialer: D) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (consumed_tx, consumed_rx) = mpsc::unbounded_channel();
        let supervisor = ReconnectSupervisor::new(config.reconnect_policy, config.auto_reconnect);

        Self {
            config,
            engine,
            dialer,
            session: SessionState::new(),
            supervisor,
            observers: Observers::new(),
            stats: SessionStats::new(),
            rewatch: None,
            events_tx,
            events_rx,
            consumed_tx,
            consumed_rx,
        }
    }

    /// Register an observer.
    ///
    /// Every event emitted after this call is delivered, in order.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ClientEvent<TrackOf<E>>> {
        self.observers.subscribe()
    }

    /// Get a handle for commanding the client once `run()` owns it
    pub fn handle(&self) -> ClientHandle {
        ClientHandle::new(self.events_tx.clone())
    }

    /// Start watching a channel.
    ///
    /// Opens the control channel; the handshake proceeds as events arrive.
    /// Fails if a control channel already exists (`reset()` first) or if
    /// called outside a tokio runtime.
    pub fn watch(&mut self, channel_id: impl Into<String>) -> Result<()> {
        if self.session.has_channel() {
            let channel_id = self.session.channel_id().unwrap_or_default().to_owned();
            return Err(UsageError::AlreadyWatching { channel_id }.into());
        }

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(UsageError::NoRuntime.into());
        }

        if let Some(task) = self.rewatch.take() {
            task.abort();
        }

        let channel_id = channel_id.into();
        let generation = self.session.begin(channel_id.clone());

        tracing::debug!(
            channel_id = %channel_id,
            generation = generation,
            server = %self.config.signaling_server,
            "Watching channel"
        );

        let events = ChannelEvents::new(generation, self.events_tx.clone());
        let channel = self.dialer.dial(&self.config.signaling_server, events);
        self.session.attach_channel(channel);
        self.emit_phase();

        Ok(())
    }

    /// Tear the current session down.
    ///
    /// Closes the control channel, drops the transport, the aggregated
    /// stream and any pending acknowledgement, and stops the viewer poll.
    /// Anything still in flight for the old session is ignored on arrival.
    pub fn reset(&mut self) {
        if let Some(task) = self.rewatch.take() {
            task.abort();
        }

        tracing::debug!(
            generation = self.session.generation(),
            polling = self.session.is_polling(),
            dropped_ack = self.session.has_pending_ack(),
            "Session reset"
        );
        self.session.reset();
        self.emit_phase();
    }

    /// Send a message on the control channel.
    ///
    /// Fails if no control channel exists. A message sent after the
    /// channel's connection died is dropped.
    pub fn send(&mut self, message: ServerboundMessage) -> Result<()> {
        let channel = self
            .session
            .channel()
            .ok_or(UsageError::NoControlChannel)?;
        if channel.is_closed() {
            tracing::debug!(message = message.kind(), "Dropping message, channel closed");
            return Ok(());
        }

        let text = message.encode()?;
        if let Err(e) = channel.send_text(text) {
            tracing::debug!(message = message.kind(), error = %e, "Dropping message");
            return Ok(());
        }

        self.stats.messages_sent += 1;
        Ok(())
    }

    /// Process events until shut down through a [`ClientHandle`]
    pub async fn run(&mut self) {
        loop {
            tokio::select! {
                event = self.events_rx.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    if matches!(event, SessionEvent::Command(Command::Shutdown)) {
                        self.reset();
                        break;
                    }
                    self.dispatch(event).await;
                }
                Some(consumed) = self.consumed_rx.recv() => self.on_consumed(consumed),
            }
        }
    }

    /// Spawn the event loop on the tokio runtime
    pub fn spawn(mut self) -> (ClientHandle, JoinHandle<()>) {
        let handle = self.handle();
        let task = tokio::spawn(async move { self.run().await });
        (handle, task)
    }

    /// Current session phase
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Channel being watched
    pub fn channel_id(&self) -> Option<&str> {
        self.session.channel_id()
    }

    /// Check if the session is consuming media
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Aggregated stream of the current session
    pub fn stream(&self) -> Option<&MediaStream<TrackOf<E>>> {
        self.session.stream()
    }

    /// Consumers instantiated by the current session, in order
    pub fn consumers(&self) -> &[ConsumerInfo] {
        self.session.consumers()
    }

    /// Snapshot of the client statistics
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            reconnects: self.supervisor.attempts(),
            duration: self.session.duration().unwrap_or_default(),
            active_duration: self.session.active_duration().unwrap_or_default(),
            ..self.stats.clone()
        }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The media engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    async fn dispatch(&mut self, event: SessionEvent) {
        if let Err(e) = self.handle_event(event).await {
            tracing::warn!(error = %e, "Failed to handle session event");
            self.observers.emit(ClientEvent::Error(e.to_string()));
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) -> Result<()> {
        if let Some(generation) = event.generation() {
            if generation != self.session.generation() {
                tracing::trace!(
                    generation = generation,
                    current = self.session.generation(),
                    "Dropping stale event"
                );
                return Ok(());
            }
        }

        match event {
            SessionEvent::Channel { event, .. } => self.on_channel_event(event).await,
            SessionEvent::Transport { event, .. } => self.on_transport_event(event),
            SessionEvent::PollTick { .. } => self.send(ServerboundMessage::PollConnectedViewers),
            SessionEvent::Rewatch { channel_id, .. } => self.watch(channel_id),
            SessionEvent::Command(command) => {
                self.on_command(command);
                Ok(())
            }
        }
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Watch { channel_id, reply } => {
                let _ = reply.send(self.watch(channel_id));
            }
            Command::Reset | Command::Shutdown => self.reset(),
        }
    }

    async fn on_channel_event(&mut self, event: ChannelEvent) -> Result<()> {
        match event {
            ChannelEvent::Open => self.on_open(),
            ChannelEvent::Frame(frame) => self.on_frame(frame).await,
            ChannelEvent::Closed { reason } => self.on_channel_closed(reason),
        }
    }

    fn on_open(&mut self) -> Result<()> {
        if !self.session.on_open() {
            return Ok(());
        }

        let channel_id = self.session.channel_id().unwrap_or_default().to_owned();
        verbose!(self.config, info, channel_id = %channel_id, "Asking to begin Init");
        self.emit_phase();

        self.send(ServerboundMessage::Begin { channel_id })
    }

    async fn on_frame(&mut self, frame: Frame) -> Result<()> {
        self.stats.frames_received += 1;

        let message = match decode_frame(&frame) {
            Ok(Some(message)) => message,
            Ok(None) => {
                self.stats.frames_ignored += 1;
                tracing::trace!(len = frame.len(), "Ignoring binary frame");
                return Ok(());
            }
            Err(e) => {
                self.stats.frames_ignored += 1;
                tracing::debug!(error = %e, len = frame.len(), "Dropping undecodable frame");
                return Ok(());
            }
        };

        verbose!(self.config, debug, message = ?message, "Websocket data");
        self.on_message(message).await
    }

    async fn on_message(&mut self, message: ClientboundMessage) -> Result<()> {
        match message {
            ClientboundMessage::Init {
                producers,
                transport,
                router_rtp_capabilities,
            } => {
                self.on_init(producers, transport, router_rtp_capabilities)
                    .await
            }
            ClientboundMessage::Connected => {
                if let Some(ack) = self.session.take_pending_ack() {
                    verbose!(self.config, info, "Server connected the transport");
                    ack.acknowledge();
                }
                Ok(())
            }
            ClientboundMessage::Consuming { consume } => self.on_consuming(consume),
            ClientboundMessage::ViewerCount { count } => {
                self.stats.viewer_count = Some(count);
                self.observers.emit(ClientEvent::ViewerCount(count));
                Ok(())
            }
            ClientboundMessage::Unknown => {
                self.stats.frames_ignored += 1;
                tracing::trace!("Ignoring message of unknown type");
                Ok(())
            }
        }
    }

    async fn on_init(
        &mut self,
        producers: Vec<ProducerId>,
        transport: TransportOptions,
        router_rtp_capabilities: RtpCapabilities,
    ) -> Result<()> {
        if self.session.has_transport() {
            tracing::warn!(transport_id = %transport.id, "Ignoring Init: receive transport exists");
            return Ok(());
        }

        verbose!(self.config, info, producers = producers.len(), "Server sent us Init");

        // Best-effort: the handshake continues with whatever the engine kept
        match self.engine.load(&router_rtp_capabilities).await {
            Ok(()) => verbose!(self.config, info, "Loaded media engine"),
            Err(e) => verbose!(
                self.config,
                warn,
                error = %e,
                "Failed to load router capabilities, continuing"
            ),
        }

        let rtp_capabilities = self.engine.rtp_capabilities();
        self.send(ServerboundMessage::Init { rtp_capabilities })?;

        let generation = self.session.generation();
        let events = TransportEvents::new(generation, self.events_tx.clone());
        let receive_transport = match self.engine.create_receive_transport(&transport, events) {
            Ok(receive_transport) => receive_transport,
            Err(e) => {
                tracing::warn!(
                    transport_id = %transport.id,
                    error = %e,
                    "Failed to create receive transport"
                );
                self.observers.emit(ClientEvent::Error(e.to_string()));
                return Ok(());
            }
        };

        let worker = ConsumeWorker::start(generation, receive_transport, self.consumed_tx.clone());
        self.session.attach_transport(worker);
        verbose!(self.config, info, transport_id = %transport.id, "Created consumer transport");
        self.emit_phase();

        self.send(ServerboundMessage::Consume)
    }

    fn on_consuming(&mut self, consume: Vec<ConsumeDescriptor>) -> Result<()> {
        let Some(worker) = self.session.consume_worker() else {
            tracing::debug!(consumers = consume.len(), "Ignoring Consuming: no receive transport");
            return Ok(());
        };

        if let Err(e) = worker.submit(consume) {
            tracing::warn!(error = %e, "Consume worker gone, dropping batch");
            return Ok(());
        }

        if self.session.activate() {
            self.on_active()?;
        }

        Ok(())
    }

    /// A descriptor finished consuming on the worker
    fn on_consumed(&mut self, consumed: Consumed<TrackOf<E>>) {
        if consumed.generation != self.session.generation() {
            tracing::trace!(
                generation = consumed.generation,
                consumer_id = %consumed.descriptor.id,
                "Dropping stale consumer"
            );
            return;
        }

        if let Err(e) = self.on_consumer(consumed) {
            tracing::warn!(error = %e, "Failed to handle consumer");
            self.observers.emit(ClientEvent::Error(e.to_string()));
        }
    }

    fn on_consumer(&mut self, consumed: Consumed<TrackOf<E>>) -> Result<()> {
        let Consumed {
            descriptor, result, ..
        } = consumed;

        let consumer = match result {
            Ok(consumer) => consumer,
            Err(e) => {
                tracing::warn!(
                    consumer_id = %descriptor.id,
                    producer_id = %descriptor.producer_id,
                    error = %e,
                    "Failed to consume producer"
                );
                self.observers.emit(ClientEvent::Error(e.to_string()));
                return Ok(());
            }
        };

        verbose!(self.config, info, kind = %consumer.kind, consumer_id = %consumer.id, "Created new track");

        self.send(ServerboundMessage::Resume {
            id: consumer.id.clone(),
        })?;

        let info = ConsumerInfo {
            id: consumer.id,
            producer_id: descriptor.producer_id,
            kind: consumer.kind,
        };

        self.stats.tracks_created += 1;
        self.observers
            .emit(ClientEvent::TrackCreated(consumer.track.clone()));

        if self.config.manage_stream {
            let stream = self.session.add_track(&info, consumer.track).clone();
            self.observers.emit(ClientEvent::StreamUpdated(stream));
        }

        self.session.record_consumer(info);
        Ok(())
    }

    fn on_active(&mut self) -> Result<()> {
        self.supervisor.on_active();
        self.emit_phase();

        if self.config.track_viewers {
            self.send(ServerboundMessage::PollConnectedViewers)?;
            let poller = ViewerPoller::start(
                self.session.generation(),
                VIEWER_POLL_INTERVAL,
                self.events_tx.clone(),
            );
            self.session.start_poller(poller);
        }

        Ok(())
    }

    fn on_channel_closed(&mut self, reason: Option<String>) -> Result<()> {
        tracing::debug!(
            channel_id = ?self.session.channel_id(),
            reason = ?reason,
            "Control channel closed"
        );

        if self.supervisor.should_reconnect(ReconnectReason::ChannelClosed) {
            self.reconnect(ReconnectReason::ChannelClosed)
        } else {
            Ok(())
        }
    }

    fn on_transport_event(&mut self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::ConnectionStateChanged(state) => {
                verbose!(self.config, info, state = %state, "Transport connection state");

                if state == ConnectionState::Disconnected
                    && self
                        .supervisor
                        .should_reconnect(ReconnectReason::TransportDisconnected)
                {
                    return self.reconnect(ReconnectReason::TransportDisconnected);
                }
                Ok(())
            }
            TransportEvent::ConnectNeeded {
                dtls_parameters,
                ack,
            } => {
                self.send(ServerboundMessage::Connect { dtls_parameters })?;
                if self.session.replace_pending_ack(ack) {
                    tracing::debug!("Replaced pending DTLS acknowledgement");
                }
                Ok(())
            }
        }
    }

    /// Reset and watch the same channel again
    fn reconnect(&mut self, reason: ReconnectReason) -> Result<()> {
        let Some(channel_id) = self.session.channel_id().map(str::to_owned) else {
            return Ok(());
        };

        verbose!(self.config, warn, channel_id = %channel_id, reason = %reason, "Disconnected, attempting to reconnect");

        self.observers.emit(ClientEvent::Reconnecting {
            channel_id: channel_id.clone(),
            reason,
        });

        self.reset();

        match self.supervisor.next_delay() {
            None => self.watch(channel_id),
            Some(delay) => {
                self.schedule_rewatch(channel_id, delay);
                Ok(())
            }
        }
    }

    fn schedule_rewatch(&mut self, channel_id: String, delay: Duration) {
        let generation = self.session.generation();
        let tx = self.events_tx.clone();

        tracing::debug!(
            channel_id = %channel_id,
            delay = ?delay,
            "Re-watch scheduled"
        );

        self.rewatch = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionEvent::Rewatch {
                generation,
                channel_id,
            });
        }));
    }

    fn emit_phase(&mut self) {
        self.observers
            .emit(ClientEvent::StateChanged(self.session.phase()));
    }

    /// Handle everything queued until the client and its tasks go quiet
    #[cfg(test)]
    pub(crate) async fn drain(&mut self) {
        loop {
            tokio::task::yield_now().await;

            let mut handled = false;
            while let Ok(event) = self.events_rx.try_recv() {
                self.dispatch(event).await;
                handled = true;
            }
            while let Ok(consumed) = self.consumed_rx.try_recv() {
                self.on_consumed(consumed);
                handled = true;
            }
            if !handled {
                break;
            }
        }
    }
}

impl<E: MediaEngine, D: Dialer> std::fmt::Debug for Client<E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("signaling_server", &self.config.signaling_server)
            .field("phase", &self.session.phase())
            .field("channel_id", &self.session.channel_id())
            .field("generation", &self.session.generation())
            .finish()
    }
}
