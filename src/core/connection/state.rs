use serde::{Deserialize, Serialize};

/// Where the reconnect loop currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Looking for the device among attached ports
    Searching,
    /// Device found, about to open its port
    Opening { address: String },
    /// Port open, reading telemetry
    Streaming,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Searching => write!(f, "Searching"),
            ConnectionState::Opening { address } => write!(f, "Opening {}", address),
            ConnectionState::Streaming => write!(f, "Streaming"),
        }
    }
}

/// Counters kept by the connection manager
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStats {
    /// Successful port opens
    pub connects: u64,
    /// Links lost to a disconnect read error
    pub disconnects: u64,
    /// Links torn down after too many empty reads
    pub stale_reconnects: u64,
    /// Total bytes read from the device
    pub bytes_received: u64,
    /// Frames handed to the dispatcher
    pub frames_dispatched: u64,
    /// Frames dropped because the dispatch queue was full
    pub frames_dropped: u64,
}
