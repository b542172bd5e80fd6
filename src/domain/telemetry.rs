use serde::{Deserialize, Serialize};

/// One decoded telemetry report from the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryRecord {
    /// Opaque device identifier
    pub client_id: String,
    /// Event tag, e.g. `usb_stream`
    pub event: String,
    /// Temperature unit override; empty means use the sensor default
    pub units: String,
    /// Sensor readings
    pub data: TelemetryData,
}

/// Numeric readings carried by a telemetry report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryData {
    pub temperature1: f64,
    pub temperature2: f64,
    #[serde(rename = "FAN_0")]
    pub fan0: u32,
    #[serde(rename = "FAN_1")]
    pub fan1: u32,
    #[serde(rename = "FAN_2")]
    pub fan2: u32,
    #[serde(rename = "FAN_3")]
    pub fan3: u32,
}

impl TelemetryRecord {
    /// Record with every reading at zero, published when the bridge goes offline.
    pub fn zeroed() -> Self {
        Self::default()
    }
}
