use crate::cli::args::OutputFormat;
use crate::core::publisher::SENSORS;
use crate::domain::config::BridgeConfig;
use crate::domain::telemetry::TelemetryRecord;
use crate::infrastructure::serial::PortListing;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_ports(&self, ports: &[PortListing]) -> Result<(), OutputError>;
    fn write_records(&self, records: &[TelemetryRecord]) -> Result<(), OutputError>;
    fn write_config(&self, config: &BridgeConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::BridgeError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_ports(&self, ports: &[PortListing]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                if ports.is_empty() {
                    println!("No serial ports found");
                }
                for port in ports {
                    println!("Found port: {}", port.address);
                    if let (Some(vid), Some(pid)) = (&port.vendor_id, &port.product_id) {
                        println!("   USB ID     {}:{}", vid, pid);
                        println!("   USB serial {}", port.serial_number.as_deref().unwrap_or("-"));
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(ports)?);
            }
            OutputFormat::Table => {
                let rows: Vec<PortTableRow> = ports.iter().map(PortTableRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        Ok(())
    }

    fn write_records(&self, records: &[TelemetryRecord]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                for record in records {
                    println!("{}", render_record(record));
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(records)?);
            }
            OutputFormat::Table => {
                let rows: Vec<RecordTableRow> = records.iter().map(RecordTableRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        Ok(())
    }

    fn write_config(&self, config: &BridgeConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Text | OutputFormat::Table => println!("{}", toml::to_string_pretty(config)?),
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "message": message }));
            }
            OutputFormat::Text | OutputFormat::Table => println!("{}", message),
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({ "error": error }));
            }
            OutputFormat::Text | OutputFormat::Table => eprintln!("Error: {}", error),
        }
        Ok(())
    }
}

/// One line per record, listing each sensor the way it is published.
pub fn render_record(record: &TelemetryRecord) -> String {
    let sensors: Vec<String> = SENSORS
        .iter()
        .map(|s| format!("{}={}{}", s.sub_key, s.value(record), s.unit(record)))
        .collect();
    format!("[{}] {} {}", record.client_id, record.event, sensors.join(" "))
}

#[derive(Tabled)]
struct PortTableRow {
    #[tabled(rename = "Port")]
    address: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "VID")]
    vendor_id: String,
    #[tabled(rename = "PID")]
    product_id: String,
    #[tabled(rename = "Serial")]
    serial_number: String,
    #[tabled(rename = "Product")]
    product: String,
}

impl From<&PortListing> for PortTableRow {
    fn from(port: &PortListing) -> Self {
        let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        Self {
            address: port.address.clone(),
            kind: port.kind.clone(),
            vendor_id: or_dash(&port.vendor_id),
            product_id: or_dash(&port.product_id),
            serial_number: or_dash(&port.serial_number),
            product: or_dash(&port.product),
        }
    }
}

#[derive(Tabled)]
struct RecordTableRow {
    #[tabled(rename = "Client")]
    client_id: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Temp0")]
    temp0: String,
    #[tabled(rename = "Temp1")]
    temp1: String,
    #[tabled(rename = "Fan0")]
    fan0: u32,
    #[tabled(rename = "Fan1")]
    fan1: u32,
    #[tabled(rename = "Fan2")]
    fan2: u32,
    #[tabled(rename = "Fan3")]
    fan3: u32,
}

impl From<&TelemetryRecord> for RecordTableRow {
    fn from(record: &TelemetryRecord) -> Self {
        Self {
            client_id: record.client_id.clone(),
            event: record.event.clone(),
            temp0: format!("{} {}", SENSORS[0].value(record), SENSORS[0].unit(record)),
            temp1: format!("{} {}", SENSORS[1].value(record), SENSORS[1].unit(record)),
            fan0: record.data.fan0,
            fan1: record.data.fan1,
            fan2: record.data.fan2,
            fan3: record.data.fan3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decoder::decode;

    #[test]
    fn test_render_record() {
        let record = decode(
            r#"{"client_id":"AABB","event":"usb_stream","units":"F","data":{"temperature1":70.2,"temperature2":71.8,"FAN_0":1500,"FAN_1":0,"FAN_2":0,"FAN_3":900}}"#,
        )
        .unwrap();

        assert_eq!(
            render_record(&record),
            "[AABB] usb_stream Temp0=70F Temp1=72F Fan0=1500RPM Fan1=0RPM Fan2=0RPM Fan3=900RPM"
        );
    }

    #[test]
    fn test_port_row_fills_missing_fields() {
        let row = PortTableRow::from(&PortListing {
            address: "COM1".to_string(),
            kind: "pci".to_string(),
            vendor_id: None,
            product_id: None,
            serial_number: None,
            product: None,
        });

        assert_eq!(row.vendor_id, "-");
        assert_eq!(row.product, "-");
    }
}
