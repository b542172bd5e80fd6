use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// cdcbridge configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Target device and transport settings
    #[serde(default)]
    pub device: DeviceConfig,
    /// Reconnect loop timing
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Frame dispatch queue
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Sensor registry backend
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// USB device identity and serial transport parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// USB vendor id, hex
    #[serde(default = "default_vendor_id")]
    pub vendor_id: String,
    /// USB product id, hex
    #[serde(default = "default_product_id")]
    pub product_id: String,
    /// Baud rate used when opening the port
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Per-read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    /// Size of the scratch buffer each read fills
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    /// Extra error message fragments that mean the device went away
    #[serde(default)]
    pub disconnect_signatures: Vec<String>,
}

/// Back-off and stale-link detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Wait between failed searches or failed opens
    #[serde(default = "default_search_backoff")]
    pub search_backoff_ms: u64,
    /// Wait after a transient read error
    #[serde(default = "default_read_error_delay")]
    pub read_error_delay_ms: u64,
    /// Consecutive empty reads tolerated before forcing a reconnect
    #[serde(default = "default_stale_read_threshold")]
    pub stale_read_threshold: u32,
    /// Wait after each empty read
    #[serde(default = "default_stale_poll_interval")]
    pub stale_poll_interval_ms: u64,
}

/// Decode/publish queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Frames waiting for decode/publish before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// Registry backend selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    Memory,
    File,
}

/// Sensor registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Backend used to store sensor values
    #[serde(default = "default_registry_backend")]
    pub backend: RegistryBackend,
    /// Root key every sensor sub-key lives under
    #[serde(default = "default_registry_root")]
    pub root_key: String,
    /// Document path for the file backend
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_vendor_id() -> String {
    "303A".to_string()
}

fn default_product_id() -> String {
    "82E5".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_read_timeout() -> u64 {
    500
}

fn default_read_buffer_size() -> usize {
    4096
}

fn default_search_backoff() -> u64 {
    5000
}

fn default_read_error_delay() -> u64 {
    1000
}

fn default_stale_read_threshold() -> u32 {
    10
}

fn default_stale_poll_interval() -> u64 {
    100
}

fn default_queue_capacity() -> usize {
    64
}

fn default_registry_backend() -> RegistryBackend {
    RegistryBackend::File
}

fn default_registry_root() -> String {
    r"Software\HWiNFO64\Sensors\Custom\WaKu Controller".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout(),
            read_buffer_size: default_read_buffer_size(),
            disconnect_signatures: Vec::new(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            search_backoff_ms: default_search_backoff(),
            read_error_delay_ms: default_read_error_delay(),
            stale_read_threshold: default_stale_read_threshold(),
            stale_poll_interval_ms: default_stale_poll_interval(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: default_registry_backend(),
            root_key: default_registry_root(),
            path: None,
        }
    }
}

impl DeviceConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl ReconnectConfig {
    pub fn search_backoff(&self) -> Duration {
        Duration::from_millis(self.search_backoff_ms)
    }

    pub fn read_error_delay(&self) -> Duration {
        Duration::from_millis(self.read_error_delay_ms)
    }

    pub fn stale_poll_interval(&self) -> Duration {
        Duration::from_millis(self.stale_poll_interval_ms)
    }

    /// Zero-delay timings for driving the state machine in tests.
    pub fn immediate() -> Self {
        Self {
            search_backoff_ms: 0,
            read_error_delay_ms: 0,
            stale_poll_interval_ms: 0,
            ..Self::default()
        }
    }
}
