//! cdcbridge Library
//!
//! Bridges JSON telemetry from a USB CDC serial device into a host sensor
//! registry: device discovery, a reconnecting read loop, streaming frame
//! extraction and publication of temperature and fan sensors.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::connection::{ConnectionManager, ConnectionState, LinkStatus, StatusObserver};
pub use crate::core::frame::FrameExtractor;
pub use crate::core::publisher::{SensorPublisher, SENSORS};
pub use crate::core::registry::SensorRegistry;
pub use crate::domain::config::BridgeConfig;
pub use crate::domain::error::{BridgeError, BridgeResult};
pub use crate::domain::telemetry::TelemetryRecord;
