use crate::core::registry::{SensorEntry, SensorRegistry};
use crate::domain::error::BridgeResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Registry kept in process memory. Used for dry runs and tests.
pub struct MemoryRegistry {
    root_key: String,
    entries: RwLock<BTreeMap<String, SensorEntry>>,
}

impl MemoryRegistry {
    pub fn new(root_key: impl Into<String>) -> Self {
        Self {
            root_key: root_key.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn get(&self, sub_key: &str) -> Option<SensorEntry> {
        self.entries.read().await.get(sub_key).cloned()
    }

    pub async fn snapshot(&self) -> BTreeMap<String, SensorEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl SensorRegistry for MemoryRegistry {
    async fn write(&self, sub_key: &str, name: &str, value: &str, unit: &str) -> BridgeResult<()> {
        self.entries
            .write()
            .await
            .insert(sub_key.to_string(), SensorEntry::new(name, value, unit));
        Ok(())
    }

    fn root_key(&self) -> &str {
        &self.root_key
    }
}
