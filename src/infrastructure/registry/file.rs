use crate::core::registry::{SensorEntry, SensorRegistry};
use crate::domain::error::{BridgeError, BridgeResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

type Document = BTreeMap<String, BTreeMap<String, SensorEntry>>;

/// Registry persisted as a TOML document.
///
/// The file mirrors the registry hierarchy: one table per root key, one
/// sub-table per sensor with `Name`, `Value` and `Unit` strings. Tables for
/// other roots already present in the file are preserved.
pub struct FileRegistry {
    path: PathBuf,
    root_key: String,
    document: Mutex<Document>,
}

impl FileRegistry {
    /// Open (or prepare to create) the document at `path`.
    pub async fn open(path: impl Into<PathBuf>, root_key: impl Into<String>) -> BridgeResult<Self> {
        let path = path.into();
        let document = if tokio::fs::try_exists(&path).await? {
            Self::load(&path).await?
        } else {
            Document::new()
        };

        Ok(Self {
            path,
            root_key: root_key.into(),
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current entries under this registry's root.
    pub async fn entries(&self) -> BTreeMap<String, SensorEntry> {
        self.document
            .lock()
            .await
            .get(&self.root_key)
            .cloned()
            .unwrap_or_default()
    }

    async fn load(path: &Path) -> BridgeResult<Document> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| BridgeError::Registry {
            message: format!("Failed to read registry file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| BridgeError::Registry {
            message: format!("Failed to parse registry file {}: {}", path.display(), e),
        })
    }

    async fn flush(&self, document: &Document) -> BridgeResult<()> {
        let content = toml::to_string_pretty(document).map_err(|e| BridgeError::Registry {
            message: format!("Failed to serialize registry: {}", e),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write then rename; readers only see complete documents.
        let staging = self.path.with_extension("toml.tmp");
        tokio::fs::write(&staging, content).await.map_err(|e| BridgeError::Registry {
            message: format!("Failed to write registry file {}: {}", staging.display(), e),
        })?;
        tokio::fs::rename(&staging, &self.path).await.map_err(|e| BridgeError::Registry {
            message: format!("Failed to replace registry file {}: {}", self.path.display(), e),
        })
    }
}

#[async_trait]
impl SensorRegistry for FileRegistry {
    async fn write(&self, sub_key: &str, name: &str, value: &str, unit: &str) -> BridgeResult<()> {
        let mut document = self.document.lock().await;
        document
            .entry(self.root_key.clone())
            .or_default()
            .insert(sub_key.to_string(), SensorEntry::new(name, value, unit));

        self.flush(&document).await?;
        debug!("Wrote {}\\{} = {} {}", self.root_key, sub_key, value, unit);
        Ok(())
    }

    fn root_key(&self) -> &str {
        &self.root_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sensors").join("registry.toml");

        let registry = FileRegistry::open(&path, r"Software\Custom\Device").await.unwrap();
        registry.write("Fan0", "Fan Pump Speed", "1200", "RPM").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let document: Document = toml::from_str(&content).unwrap();
        let entry = &document[r"Software\Custom\Device"]["Fan0"];
        assert_eq!(entry, &SensorEntry::new("Fan Pump Speed", "1200", "RPM"));
    }

    #[tokio::test]
    async fn test_reopen_keeps_entries_and_other_roots() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.toml");

        let other = FileRegistry::open(&path, "other").await.unwrap();
        other.write("X", "x", "1", "").await.unwrap();
        drop(other);

        let registry = FileRegistry::open(&path, "main").await.unwrap();
        registry.write("Temp0", "Temperature sensor 0", "21", "°C").await.unwrap();
        drop(registry);

        let reopened = FileRegistry::open(&path, "main").await.unwrap();
        assert_eq!(reopened.entries().await["Temp0"].value, "21");

        let other = FileRegistry::open(&path, "other").await.unwrap();
        assert_eq!(other.entries().await["X"].name, "x");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let result = FileRegistry::open(&path, "main").await;
        assert!(matches!(result, Err(BridgeError::Registry { .. })));
    }
}
