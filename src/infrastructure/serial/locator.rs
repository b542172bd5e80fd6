use crate::domain::error::{BridgeError, BridgeResult};
use serde::Serialize;
use serialport::{SerialPortInfo, SerialPortType};
use tracing::debug;

/// Source of the serial ports currently attached to the host.
pub trait PortEnumerator: Send + Sync {
    fn ports(&self) -> BridgeResult<Vec<SerialPortInfo>>;
}

/// Enumerates ports through the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortEnumerator for SystemPorts {
    fn ports(&self) -> BridgeResult<Vec<SerialPortInfo>> {
        serialport::available_ports().map_err(|e| BridgeError::Enumeration {
            message: format!("Failed to list serial ports: {}", e),
        })
    }
}

/// A USB serial device found during a search. Never cached across attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub vendor_id: String,
    pub product_id: String,
    pub address: String,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

/// Any enumerated port, USB or not, for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortListing {
    pub address: String,
    pub kind: String,
    pub vendor_id: Option<String>,
    pub product_id: Option<String>,
    pub serial_number: Option<String>,
    pub product: Option<String>,
}

/// Finds the port of a USB device by vendor and product id.
pub struct DeviceLocator {
    enumerator: Box<dyn PortEnumerator>,
}

impl DeviceLocator {
    pub fn new(enumerator: Box<dyn PortEnumerator>) -> Self {
        Self { enumerator }
    }

    pub fn system() -> Self {
        Self::new(Box::new(SystemPorts))
    }

    /// Re-enumerate and return the first USB port whose ids match.
    ///
    /// Ids compare case-insensitively; a `0x` prefix and missing leading zeros
    /// in the requested ids are accepted.
    pub fn find(&self, vendor_id: &str, product_id: &str) -> BridgeResult<DeviceDescriptor> {
        let wanted_vid = normalize_id(vendor_id);
        let wanted_pid = normalize_id(product_id);

        for port in self.enumerator.ports()? {
            debug!("Found port: {}", port.port_name);

            if let SerialPortType::UsbPort(usb) = &port.port_type {
                let vid = format_id(usb.vid);
                let pid = format_id(usb.pid);
                debug!(
                    "   USB ID {}:{} serial {}",
                    vid,
                    pid,
                    usb.serial_number.as_deref().unwrap_or("-")
                );

                if vid.eq_ignore_ascii_case(&wanted_vid) && pid.eq_ignore_ascii_case(&wanted_pid) {
                    return Ok(DeviceDescriptor {
                        vendor_id: vid,
                        product_id: pid,
                        address: port.port_name.clone(),
                        serial_number: usb.serial_number.clone(),
                        manufacturer: usb.manufacturer.clone(),
                        product: usb.product.clone(),
                    });
                }
            }
        }

        Err(BridgeError::DeviceNotFound {
            vendor_id: vendor_id.to_string(),
            product_id: product_id.to_string(),
        })
    }

    /// Every attached port, in enumeration order.
    pub fn list(&self) -> BridgeResult<Vec<PortListing>> {
        Ok(self
            .enumerator
            .ports()?
            .into_iter()
            .map(|port| match port.port_type {
                SerialPortType::UsbPort(usb) => PortListing {
                    address: port.port_name,
                    kind: "usb".to_string(),
                    vendor_id: Some(format_id(usb.vid)),
                    product_id: Some(format_id(usb.pid)),
                    serial_number: usb.serial_number,
                    product: usb.product,
                },
                other => PortListing {
                    address: port.port_name,
                    kind: match other {
                        SerialPortType::PciPort => "pci",
                        SerialPortType::BluetoothPort => "bluetooth",
                        _ => "unknown",
                    }
                    .to_string(),
                    vendor_id: None,
                    product_id: None,
                    serial_number: None,
                    product: None,
                },
            })
            .collect())
    }
}

fn format_id(id: u16) -> String {
    format!("{:04X}", id)
}

fn normalize_id(id: &str) -> String {
    let id = id.trim();
    let id = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .unwrap_or(id);
    format!("{:0>4}", id.to_ascii_uppercase())
}
