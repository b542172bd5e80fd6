use crate::domain::error::BridgeResult;
use async_trait::async_trait;

/// Write side of the hierarchical store a monitoring dashboard reads sensors from.
///
/// Each sensor lives in its own sub-key under a fixed root and holds three
/// string entries: `Name`, `Value` and `Unit`.
#[async_trait]
pub trait SensorRegistry: Send + Sync {
    /// Create or update one sensor sub-key.
    async fn write(&self, sub_key: &str, name: &str, value: &str, unit: &str) -> BridgeResult<()>;

    /// Root key the sub-keys live under.
    fn root_key(&self) -> &str;
}

/// Snapshot of a single sensor sub-key.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SensorEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Unit")]
    pub unit: String,
}

impl SensorEntry {
    pub fn new(name: &str, value: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            unit: unit.to_string(),
        }
    }
}
