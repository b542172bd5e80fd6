use crate::core::connection::state::{ConnectionState, ConnectionStats};
use crate::core::connection::status::{LinkStatus, StatusObserver};
use crate::core::connection::transport::{DisconnectClassifier, Transport, TransportOpener};
use crate::core::dispatch::{DispatchSummary, FrameDispatcher};
use crate::core::frame::FrameExtractor;
use crate::core::publisher::SensorPublisher;
use crate::domain::config::{BridgeConfig, DeviceConfig, ReconnectConfig};
use crate::domain::error::BridgeResult;
use crate::domain::telemetry::TelemetryRecord;
use crate::infrastructure::serial::DeviceLocator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Drives device search, port open and streaming reads, reconnecting forever
/// until shutdown is requested.
pub struct ConnectionManager {
    locator: DeviceLocator,
    opener: Box<dyn TransportOpener>,
    status: Arc<dyn StatusObserver>,
    publisher: SensorPublisher,
    dispatcher: FrameDispatcher,
    classifier: DisconnectClassifier,
    device: DeviceConfig,
    reconnect: ReconnectConfig,
    state: ConnectionState,
    transport: Option<Box<dyn Transport>>,
    extractor: FrameExtractor,
    scratch: Vec<u8>,
    stale_reads: u32,
    session_id: Option<String>,
    stats: ConnectionStats,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionManager {
    /// Build a manager in the `Searching` state. Spawns the dispatch worker,
    /// so it must be called from within a tokio runtime.
    pub fn new(
        config: &BridgeConfig,
        locator: DeviceLocator,
        opener: Box<dyn TransportOpener>,
        status: Arc<dyn StatusObserver>,
        publisher: SensorPublisher,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let dispatcher = FrameDispatcher::spawn(publisher.clone(), config.dispatch.queue_capacity);

        Self {
            locator,
            opener,
            status,
            publisher,
            dispatcher,
            classifier: DisconnectClassifier::new(&config.device.disconnect_signatures),
            device: config.device.clone(),
            reconnect: config.reconnect.clone(),
            state: ConnectionState::Searching,
            transport: None,
            extractor: FrameExtractor::new(),
            scratch: vec![0u8; config.device.read_buffer_size.max(1)],
            stale_reads: 0,
            session_id: None,
            stats: ConnectionStats::default(),
            shutdown,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Consecutive empty reads in the current streaming session.
    pub fn stale_reads(&self) -> u32 {
        self.stale_reads
    }

    /// True once the shutdown flag is set or its sender is gone.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.has_changed().is_err() || *self.shutdown.borrow()
    }

    /// Run until shutdown, then publish a zeroed record as the offline signal.
    ///
    /// Only a fatal error (device enumeration failing) ends the loop early.
    pub async fn run(mut self) -> BridgeResult<ConnectionStats> {
        info!(
            "Telemetry bridge started, looking for device {}:{}",
            self.device.vendor_id, self.device.product_id
        );

        let mut result = Ok(());
        while !self.shutdown_requested() {
            if let Err(e) = self.step().await {
                error!("Telemetry bridge stopping: {}", e);
                result = Err(e);
                break;
            }
        }

        let stats = self.stats.clone();
        let summary = self.go_offline().await;
        info!(?stats, ?summary, "Telemetry bridge stopped");

        result.map(|_| stats)
    }

    /// Perform one state machine transition or streaming read.
    pub async fn step(&mut self) -> BridgeResult<()> {
        match self.state.clone() {
            ConnectionState::Searching => self.search().await,
            ConnectionState::Opening { address } => {
                self.open(&address).await;
                Ok(())
            }
            ConnectionState::Streaming => {
                self.read().await;
                Ok(())
            }
        }
    }

    /// Close the link, drain queued frames and publish the zeroed record.
    /// Not time-bounded: a hanging registry write delays shutdown.
    pub async fn go_offline(self) -> DispatchSummary {
        let ConnectionManager {
            mut transport,
            status,
            publisher,
            dispatcher,
            ..
        } = self;

        if let Some(transport) = transport.take() {
            info!("Closing serial port {}", transport.address());
        }
        status.set_status(LinkStatus::NotConnected);

        let summary = dispatcher.close().await;
        info!("Publishing zeroed telemetry before exit");
        publisher.publish(&TelemetryRecord::zeroed()).await;

        summary
    }

    async fn search(&mut self) -> BridgeResult<()> {
        match self.locator.find(&self.device.vendor_id, &self.device.product_id) {
            Ok(device) => {
                info!(
                    "Found device {}:{} on {}",
                    device.vendor_id, device.product_id, device.address
                );
                self.state = ConnectionState::Opening {
                    address: device.address,
                };
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                info!(
                    "Error finding device: {}. Retrying in {:?}...",
                    e,
                    self.reconnect.search_backoff()
                );
                self.status.set_status(LinkStatus::NotConnected);
                self.pause(self.reconnect.search_backoff()).await;
                Ok(())
            }
        }
    }

    async fn open(&mut self, address: &str) {
        match self.opener.open(address) {
            Ok(transport) => {
                let session_id = uuid::Uuid::new_v4().simple().to_string();
                info!(session = %session_id, "Successfully opened serial port {}", address);

                self.status.set_status(LinkStatus::Connected);
                self.stale_reads = 0;
                self.extractor.reset();
                self.transport = Some(transport);
                self.session_id = Some(session_id);
                self.stats.connects += 1;
                self.state = ConnectionState::Streaming;
            }
            Err(e) => {
                warn!(
                    "Error opening serial port {}: {}. Retrying in {:?}...",
                    address,
                    e,
                    self.reconnect.search_backoff()
                );
                self.status.set_status(LinkStatus::NotConnected);
                self.state = ConnectionState::Searching;
                self.pause(self.reconnect.search_backoff()).await;
            }
        }
    }

    async fn read(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            self.state = ConnectionState::Searching;
            return;
        };
        let result = transport.read(&mut self.scratch);
        let session = self.session_id.clone().unwrap_or_default();

        match result {
            Err(e) if self.classifier.is_disconnect(&e) => {
                info!(session = %session, "Serial port disconnected ({}). Attempting to reconnect...", e);
                self.stats.disconnects += 1;
                self.close_link();
            }
            Err(e) => {
                warn!(session = %session, "Error reading from serial port: {}", e);
                self.pause(self.reconnect.read_error_delay()).await;
            }
            Ok(0) => {
                self.stale_reads += 1;
                self.pause(self.reconnect.stale_poll_interval()).await;

                if self.stale_reads > self.reconnect.stale_read_threshold {
                    warn!(session = %session, "No data after {} reads, reopening port", self.stale_reads);
                    self.stats.stale_reconnects += 1;
                    self.close_link();
                }
            }
            Ok(n) => {
                self.stale_reads = 0;
                self.stats.bytes_received += n as u64;
                self.extractor.feed(&self.scratch[..n]);

                for frame in self.extractor.drain() {
                    debug!(session = %session, "Frame of {} bytes extracted", frame.len());
                    if self.dispatcher.dispatch(frame) {
                        self.stats.frames_dispatched += 1;
                    } else {
                        self.stats.frames_dropped += 1;
                    }
                }
            }
        }
    }

    fn close_link(&mut self) {
        self.transport = None;
        self.session_id = None;
        self.stale_reads = 0;
        self.status.set_status(LinkStatus::NotConnected);
        self.state = ConnectionState::Searching;
    }

    /// Sleep, waking early when shutdown is requested.
    async fn pause(&mut self, duration: Duration) {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.shutdown.changed() => {}
        }
    }
}
