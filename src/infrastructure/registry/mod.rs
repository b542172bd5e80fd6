// Registry module - Sensor registry backends
pub mod file;
pub mod memory;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;

use crate::core::registry::SensorRegistry;
use crate::domain::config::{RegistryBackend, RegistryConfig};
use crate::domain::error::{BridgeError, BridgeResult};
use std::sync::Arc;

/// File name used by the file backend when no path is configured.
pub const DEFAULT_REGISTRY_FILE: &str = "sensors.toml";

/// Build the registry backend selected in the configuration.
pub async fn open_registry(config: &RegistryConfig) -> BridgeResult<Arc<dyn SensorRegistry>> {
    match config.backend {
        RegistryBackend::Memory => Ok(Arc::new(MemoryRegistry::new(config.root_key.clone()))),
        RegistryBackend::File => {
            let path = match &config.path {
                Some(path) => path.clone(),
                None => dirs::data_local_dir()
                    .ok_or_else(|| BridgeError::Config {
                        message: "Could not determine local data directory".to_string(),
                    })?
                    .join("cdcbridge")
                    .join(DEFAULT_REGISTRY_FILE),
            };
            Ok(Arc::new(FileRegistry::open(path, config.root_key.clone()).await?))
        }
    }
}
