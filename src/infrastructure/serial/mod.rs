// Serial module - Device discovery and serial transport
pub mod locator;
pub mod transport;

pub use locator::{DeviceDescriptor, DeviceLocator, PortEnumerator, PortListing, SystemPorts};
pub use transport::{SerialOpener, SerialTransport};
