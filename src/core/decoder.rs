use crate::domain::telemetry::TelemetryRecord;
use thiserror::Error;

/// A frame that could not be turned into a [`TelemetryRecord`].
#[derive(Error, Debug)]
#[error("malformed telemetry frame: {source}")]
pub struct DecodeError {
    #[from]
    source: serde_json::Error,
}

/// Decode one frame's text. Absent fields take zero values; invalid syntax or
/// mistyped fields are rejected.
pub fn decode(text: &str) -> Result<TelemetryRecord, DecodeError> {
    Ok(serde_json::from_str(text)?)
}
