use crate::core::decoder;
use crate::core::publisher::SensorPublisher;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// What the dispatch worker did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub decoded: u64,
    pub rejected: u64,
    pub partial_publishes: u64,
}

/// Hands frames from the read loop to a single decode/publish worker.
///
/// Frames are processed in arrival order. The queue is bounded; when it is
/// full new frames are dropped so the read loop never waits on the registry.
pub struct FrameDispatcher {
    sender: mpsc::Sender<String>,
    worker: JoinHandle<DispatchSummary>,
}

impl FrameDispatcher {
    /// Spawn the worker. Must be called from within a tokio runtime.
    pub fn spawn(publisher: SensorPublisher, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(Self::work(publisher, receiver));
        Self { sender, worker }
    }

    /// Queue a frame. Returns false when it had to be dropped.
    pub fn dispatch(&self, frame: String) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(frame)) => {
                warn!("Dispatch queue full, dropping frame of {} bytes", frame.len());
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Dispatch worker stopped, dropping frame");
                false
            }
        }
    }

    /// Stop accepting frames and wait for the queued ones to be published.
    pub async fn close(self) -> DispatchSummary {
        drop(self.sender);
        match self.worker.await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Dispatch worker ended abnormally: {}", e);
                DispatchSummary::default()
            }
        }
    }

    async fn work(publisher: SensorPublisher, mut receiver: mpsc::Receiver<String>) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        while let Some(frame) = receiver.recv().await {
            match decoder::decode(&frame) {
                Ok(record) => {
                    summary.decoded += 1;
                    if !publisher.publish(&record).await.is_complete() {
                        summary.partial_publishes += 1;
                    }
                }
                Err(e) => {
                    summary.rejected += 1;
                    warn!("Error decoding frame: {}, frame: {}", e, frame);
                }
            }
        }

        debug!(?summary, "Dispatch worker finished");
        summary
    }
}
