use crate::core::connection::transport::{Transport, TransportOpener};
use crate::domain::config::DeviceConfig;
use crate::domain::error::{BridgeError, BridgeResult};
use serialport::SerialPort;
use std::io::{self, Read};
use std::time::Duration;
use tracing::info;

/// Opens serial ports with a fixed baud rate and read timeout.
#[derive(Debug, Clone)]
pub struct SerialOpener {
    baud_rate: u32,
    read_timeout: Duration,
}

impl SerialOpener {
    pub fn new(baud_rate: u32, read_timeout: Duration) -> Self {
        Self {
            baud_rate,
            read_timeout,
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.baud_rate, config.read_timeout())
    }
}

impl TransportOpener for SerialOpener {
    fn open(&self, address: &str) -> BridgeResult<Box<dyn Transport>> {
        let port = serialport::new(address, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .timeout(self.read_timeout)
            .open()
            .map_err(BridgeError::Serial)?;

        info!("Serial port {} opened at {} baud", address, self.baud_rate);

        Ok(Box::new(SerialTransport {
            address: address.to_string(),
            port,
        }))
    }
}

/// Serial port wrapped as a [`Transport`].
pub struct SerialTransport {
    address: String,
    port: Box<dyn SerialPort>,
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            // An idle link shows up as a timeout; report it as an empty read.
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            other => other,
        }
    }

    fn address(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_fails_gracefully() {
        let opener = SerialOpener::new(115_200, Duration::from_millis(100));

        // This should fail because the path is not a serial port
        let result = opener.open("/nonexistent/cdcbridge-port");
        assert!(result.is_err());
    }

    #[test]
    fn test_opener_from_config() {
        let config = DeviceConfig::default();
        let opener = SerialOpener::from_config(&config);
        assert_eq!(opener.baud_rate, 115_200);
        assert_eq!(opener.read_timeout, Duration::from_millis(500));
    }
}
