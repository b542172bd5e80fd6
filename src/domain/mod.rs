// Domain module - Configuration, telemetry model and errors
pub mod config;
pub mod error;
pub mod telemetry;
