// Connection module - Device reconnect loop
pub mod manager;
pub mod state;
pub mod status;
pub mod transport;

pub use manager::ConnectionManager;
pub use state::{ConnectionState, ConnectionStats};
pub use status::{LinkStatus, StatusObserver, WatchStatus};
pub use transport::{DisconnectClassifier, Transport, TransportOpener};
