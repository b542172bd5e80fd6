use crate::core::registry::SensorRegistry;
use crate::domain::telemetry::TelemetryRecord;
use std::sync::Arc;
use tracing::{debug, warn};

/// Unit used for temperatures when the device does not name one.
pub const DEFAULT_TEMPERATURE_UNIT: &str = "°C";
pub const FAN_UNIT: &str = "RPM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Fan,
}

/// One row of the static sensor table.
#[derive(Clone, Copy)]
pub struct SensorDescriptor {
    pub sub_key: &'static str,
    pub display_name: &'static str,
    pub default_unit: &'static str,
    pub kind: SensorKind,
    value: fn(&TelemetryRecord) -> String,
}

impl SensorDescriptor {
    pub fn value(&self, record: &TelemetryRecord) -> String {
        (self.value)(record)
    }

    pub fn unit<'a>(&'a self, record: &'a TelemetryRecord) -> &'a str {
        match self.kind {
            SensorKind::Temperature if !record.units.is_empty() => &record.units,
            _ => self.default_unit,
        }
    }
}

impl std::fmt::Debug for SensorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorDescriptor")
            .field("sub_key", &self.sub_key)
            .field("display_name", &self.display_name)
            .field("default_unit", &self.default_unit)
            .field("kind", &self.kind)
            .finish()
    }
}

fn temperature1(record: &TelemetryRecord) -> String {
    format!("{:.0}", record.data.temperature1)
}

fn temperature2(record: &TelemetryRecord) -> String {
    format!("{:.0}", record.data.temperature2)
}

fn fan0(record: &TelemetryRecord) -> String {
    record.data.fan0.to_string()
}

fn fan1(record: &TelemetryRecord) -> String {
    record.data.fan1.to_string()
}

fn fan2(record: &TelemetryRecord) -> String {
    record.data.fan2.to_string()
}

fn fan3(record: &TelemetryRecord) -> String {
    record.data.fan3.to_string()
}

/// Sensors exposed to the dashboard, in publish order.
pub static SENSORS: [SensorDescriptor; 6] = [
    SensorDescriptor {
        sub_key: "Temp0",
        display_name: "Temperature sensor 0",
        default_unit: DEFAULT_TEMPERATURE_UNIT,
        kind: SensorKind::Temperature,
        value: temperature1,
    },
    SensorDescriptor {
        sub_key: "Temp1",
        display_name: "Temperature sensor 1",
        default_unit: DEFAULT_TEMPERATURE_UNIT,
        kind: SensorKind::Temperature,
        value: temperature2,
    },
    SensorDescriptor {
        sub_key: "Fan0",
        display_name: "Fan Pump Speed",
        default_unit: FAN_UNIT,
        kind: SensorKind::Fan,
        value: fan0,
    },
    SensorDescriptor {
        sub_key: "Fan1",
        display_name: "Fan 1 Speed",
        default_unit: FAN_UNIT,
        kind: SensorKind::Fan,
        value: fan1,
    },
    SensorDescriptor {
        sub_key: "Fan2",
        display_name: "Fan 2 Speed",
        default_unit: FAN_UNIT,
        kind: SensorKind::Fan,
        value: fan2,
    },
    SensorDescriptor {
        sub_key: "Fan3",
        display_name: "Fan 3 Speed",
        default_unit: FAN_UNIT,
        kind: SensorKind::Fan,
        value: fan3,
    },
];

/// Outcome of publishing one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishReport {
    pub written: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

impl PublishReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Projects telemetry records onto the sensor table and writes them to a registry.
#[derive(Clone)]
pub struct SensorPublisher {
    registry: Arc<dyn SensorRegistry>,
}

impl SensorPublisher {
    pub fn new(registry: Arc<dyn SensorRegistry>) -> Self {
        Self { registry }
    }

    /// Write every sensor of `record`. A failed sensor does not stop the others.
    pub async fn publish(&self, record: &TelemetryRecord) -> PublishReport {
        let mut report = PublishReport::default();

        for sensor in SENSORS.iter() {
            let value = sensor.value(record);
            let unit = sensor.unit(record);

            match self
                .registry
                .write(sensor.sub_key, sensor.display_name, &value, unit)
                .await
            {
                Ok(()) => report.written.push(sensor.sub_key),
                Err(e) => {
                    warn!(
                        "Failed to write sensor {}\\{}: {}",
                        self.registry.root_key(),
                        sensor.sub_key,
                        e
                    );
                    report.failed.push((sensor.sub_key, e.to_string()));
                }
            }
        }

        debug!(
            client_id = %record.client_id,
            event = %record.event,
            "Registry updated ({} written, {} failed). Last telemetry: {:?}",
            report.written.len(),
            report.failed.len(),
            record.data
        );

        report
    }
}
