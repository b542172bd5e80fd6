// Core module - Telemetry pipeline
pub mod connection;
pub mod decoder;
pub mod dispatch;
pub mod frame;
pub mod publisher;
pub mod registry;
