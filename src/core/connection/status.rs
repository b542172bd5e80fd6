use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// Externally visible link label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    Connected,
    NotConnected,
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkStatus::Connected => write!(f, "connected"),
            LinkStatus::NotConnected => write!(f, "not connected"),
        }
    }
}

/// Receives the link label whenever the connection manager changes state.
pub trait StatusObserver: Send + Sync {
    fn set_status(&self, status: LinkStatus);
}

/// Publishes the label on a watch channel so other tasks can follow it.
#[derive(Debug)]
pub struct WatchStatus {
    sender: watch::Sender<LinkStatus>,
}

impl WatchStatus {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(LinkStatus::NotConnected);
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<LinkStatus> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> LinkStatus {
        *self.sender.borrow()
    }
}

impl Default for WatchStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusObserver for WatchStatus {
    fn set_status(&self, status: LinkStatus) {
        self.sender.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            info!(%status, "Device status changed");
            *current = status;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(LinkStatus::Connected.to_string(), "connected");
        assert_eq!(LinkStatus::NotConnected.to_string(), "not connected");
    }

    #[tokio::test]
    async fn test_watch_status_notifies_on_change_only() {
        let status = WatchStatus::new();
        let mut receiver = status.subscribe();

        status.set_status(LinkStatus::NotConnected);
        assert!(!receiver.has_changed().unwrap());

        status.set_status(LinkStatus::Connected);
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), LinkStatus::Connected);
        assert_eq!(status.current(), LinkStatus::Connected);
    }
}
