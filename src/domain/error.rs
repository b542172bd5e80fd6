use thiserror::Error;

/// cdcbridge unified error type
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Device enumeration failed: {message}")]
    Enumeration { message: String },

    #[error("Device with VID {vendor_id} and PID {product_id} not found")]
    DeviceNotFound {
        vendor_id: String,
        product_id: String,
    },

    #[error("Telemetry decode error: {0}")]
    Decode(#[from] crate::core::decoder::DecodeError),

    #[error("Registry error: {message}")]
    Registry { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl BridgeError {
    /// Fatal errors stop the bridge; everything else is retried by the reconnect loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::Enumeration { .. } | BridgeError::Config { .. })
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
