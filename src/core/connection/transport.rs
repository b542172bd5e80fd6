use crate::domain::error::BridgeResult;
use std::io;

/// An open byte stream to the device. Dropping it closes the link.
pub trait Transport: Send {
    /// Read with the transport's bounded timeout. `Ok(0)` means nothing arrived.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Address the transport was opened on.
    fn address(&self) -> &str;
}

/// Opens transports at addresses produced by the device locator.
pub trait TransportOpener: Send + Sync {
    fn open(&self, address: &str) -> BridgeResult<Box<dyn Transport>>;
}

/// Message Windows reports when the USB device behind a COM port is removed.
pub const WINDOWS_ABORTED_MESSAGE: &str =
    "The I/O operation has been aborted because of either a thread exit or an application request.";

#[cfg(windows)]
const REMOVAL_OS_ERRORS: &[i32] = &[
    995, // ERROR_OPERATION_ABORTED
    22,  // ERROR_BAD_COMMAND
    1167, // ERROR_DEVICE_NOT_CONNECTED
];

#[cfg(unix)]
const REMOVAL_OS_ERRORS: &[i32] = &[
    5,  // EIO
    6,  // ENXIO
    19, // ENODEV
];

#[cfg(not(any(windows, unix)))]
const REMOVAL_OS_ERRORS: &[i32] = &[];

/// Decides whether a read error means the device was unplugged.
#[derive(Debug, Clone, Default)]
pub struct DisconnectClassifier {
    signatures: Vec<String>,
}

impl DisconnectClassifier {
    /// `extra_signatures` are message fragments matched in addition to the built-in ones.
    pub fn new(extra_signatures: &[String]) -> Self {
        let mut signatures = vec![WINDOWS_ABORTED_MESSAGE.to_string()];
        signatures.extend(extra_signatures.iter().filter(|s| !s.is_empty()).cloned());
        Self { signatures }
    }

    pub fn is_disconnect(&self, err: &io::Error) -> bool {
        if matches!(
            err.kind(),
            io::ErrorKind::BrokenPipe
                | io::ErrorKind::NotConnected
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::UnexpectedEof
        ) {
            return true;
        }

        if let Some(code) = err.raw_os_error() {
            if REMOVAL_OS_ERRORS.contains(&code) {
                return true;
            }
        }

        let message = err.to_string();
        self.signatures.iter().any(|s| message.contains(s.as_str()))
    }
}
