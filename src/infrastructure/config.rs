use crate::domain::{config::BridgeConfig, error::{BridgeError, BridgeResult}};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".cdcbridge";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> Self {
        Self {
            global_config_path: Self::get_global_config_path(),
            project_config_path: Self::find_project_config_path(),
        }
    }

    /// Load configuration: project file, else global file, else defaults
    pub fn load_config(&self) -> BridgeResult<BridgeConfig> {
        let candidates = [&self.project_config_path, &self.global_config_path];

        for path in candidates.into_iter().flatten() {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return self.load_config_from_path(path);
            }
        }

        Ok(BridgeConfig::default())
    }

    /// Global configuration path (`~/.config/cdcbridge/config.toml`)
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cdcbridge").join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        Self::find_config_above(&current_dir)
    }

    fn find_config_above(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> BridgeResult<BridgeConfig> {
        let content = fs::read_to_string(path).map_err(|e| BridgeError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| BridgeError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &BridgeConfig) -> BridgeResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| BridgeError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| BridgeError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create default project configuration, returning its path
    pub fn init_project_config(&self, path: &Path) -> BridgeResult<PathBuf> {
        let config_dir = path.join(CONFIG_DIR);
        let config_file = config_dir.join(CONFIG_FILE);

        if config_file.exists() {
            return Err(BridgeError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| BridgeError::Config {
            message: format!("Failed to create {} directory: {}", CONFIG_DIR, e),
        })?;

        let mut config = BridgeConfig::default();
        config.registry.path = Some(config_dir.join("sensors.toml"));

        self.save_config_to_path(&config_file, &config)?;

        Ok(config_file)
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path (if the platform has one)
    pub fn get_global_config_path_ref(&self) -> Option<&PathBuf> {
        self.global_config_path.as_ref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
