use crate::cli::args::{Args, Command, ConfigCommand, OutputFormat, RunArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::connection::{ConnectionManager, LinkStatus, WatchStatus};
use crate::core::decoder::{self, DecodeError};
use crate::core::frame::FrameExtractor;
use crate::core::publisher::SensorPublisher;
use crate::domain::config::{BridgeConfig, RegistryBackend};
use crate::domain::error::{BridgeError, BridgeResult};
use crate::domain::telemetry::TelemetryRecord;
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::registry::open_registry;
use crate::infrastructure::serial::{DeviceLocator, SerialOpener};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Chunk size used to replay captures, matching the live read buffer.
const REPLAY_CHUNK: usize = 4096;

/// Execute CLI command
pub async fn execute_command(args: Args) -> BridgeResult<()> {
    let writer = ConsoleWriter::new(args.output);

    let config_manager = ConfigManager::new();
    let config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(config_path)?
    } else {
        config_manager.load_config()?
    };

    if !args.quiet {
        init_logging(&config.global.log_level, args.verbose)?;
    }

    match args.command {
        Command::Run(run_args) => run_bridge(apply_overrides(config, run_args), args.output).await,
        Command::List => {
            let ports = DeviceLocator::system().list()?;
            writer.write_ports(&ports)?;
            Ok(())
        }
        Command::Decode { input } => {
            let bytes = read_capture(&input)?;
            let (records, rejected) = decode_capture(&bytes);
            for (frame, error) in &rejected {
                writer.write_error(&format!("{}: {}", error, frame))?;
            }
            writer.write_records(&records)?;

            // A capture with frames but nothing decodable is an error.
            match rejected.into_iter().next() {
                Some((_, error)) if records.is_empty() => Err(error.into()),
                _ => Ok(()),
            }
        }
        Command::Config(config_args) => match config_args.command {
            ConfigCommand::Show => {
                writer.write_config(&config)?;
                Ok(())
            }
            ConfigCommand::Init { path } => {
                let dir = match path {
                    Some(path) => path,
                    None => std::env::current_dir()?,
                };
                let created = config_manager.init_project_config(&dir)?;
                writer.write_message(&format!("Created {}", created.display()))?;
                Ok(())
            }
        },
        Command::Version => {
            writer.write_message(&format!("cdcbridge {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

/// Fold `run` command line overrides into the loaded configuration.
pub fn apply_overrides(mut config: BridgeConfig, args: RunArgs) -> BridgeConfig {
    if let Some(vid) = args.vid {
        config.device.vendor_id = vid;
    }
    if let Some(pid) = args.pid {
        config.device.product_id = pid;
    }
    if let Some(path) = args.registry_file {
        config.registry.backend = RegistryBackend::File;
        config.registry.path = Some(path);
    }
    if args.dry_run {
        config.registry.backend = RegistryBackend::Memory;
    }
    config
}

/// Split a captured byte stream into records, replaying it in read-sized chunks.
/// Returns decoded records and the rejected frames with their errors.
pub fn decode_capture(bytes: &[u8]) -> (Vec<TelemetryRecord>, Vec<(String, DecodeError)>) {
    let mut extractor = FrameExtractor::new();
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for chunk in bytes.chunks(REPLAY_CHUNK) {
        extractor.feed(chunk);
        for frame in extractor.drain() {
            match decoder::decode(&frame) {
                Ok(record) => records.push(record),
                Err(e) => rejected.push((frame, e)),
            }
        }
    }

    (records, rejected)
}

fn read_capture(input: &str) -> BridgeResult<Vec<u8>> {
    if input == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        std::fs::read(PathBuf::from(input)).map_err(|e| {
            BridgeError::InvalidInput(format!("Failed to read capture {}: {}", input, e))
        })
    }
}

/// Print every link status change until the status source is dropped.
pub async fn forward_status<W: OutputWriter>(
    mut status: watch::Receiver<LinkStatus>,
    writer: W,
) -> BridgeResult<()> {
    while status.changed().await.is_ok() {
        let current = *status.borrow_and_update();
        writer.write_message(&format!("Device status: {}", current))?;
    }
    Ok(())
}

async fn run_bridge(config: BridgeConfig, format: OutputFormat) -> BridgeResult<()> {
    let registry = open_registry(&config.registry).await?;
    info!("Publishing sensors under {}", registry.root_key());

    let publisher = SensorPublisher::new(registry);
    let status = Arc::new(WatchStatus::new());
    let follower = tokio::spawn(forward_status(status.subscribe(), ConsoleWriter::new(format)));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let manager = ConnectionManager::new(
        &config,
        DeviceLocator::system(),
        Box::new(SerialOpener::from_config(&config.device)),
        status,
        publisher,
        shutdown_rx,
    );
    let mut bridge = tokio::spawn(manager.run());

    let finished = tokio::select! {
        outcome = &mut bridge => Some(outcome),
        _ = shutdown_signal() => None,
    };
    let outcome = match finished {
        Some(outcome) => outcome,
        None => {
            info!("Exiting telemetry bridge");
            let _ = shutdown_tx.send(true);
            bridge.await
        }
    };

    // The manager owned the last status handle, so the follower ends once it
    // has printed the final label.
    match follower.await {
        Ok(Err(e)) => warn!("Failed to report device status: {}", e),
        Err(e) => warn!("Status follower failed: {}", e),
        Ok(Ok(())) => {}
    }

    match outcome {
        Ok(Ok(stats)) => {
            info!(?stats, "Bridge finished");
            Ok(())
        }
        Ok(Err(e)) => Err(e),
        Err(e) => Err(BridgeError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("bridge task failed: {}", e),
        ))),
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::output::OutputError;
    use crate::core::connection::StatusObserver;

    #[test]
    fn test_apply_overrides() {
        let config = apply_overrides(
            BridgeConfig::default(),
            RunArgs {
                vid: Some("1a86".to_string()),
                pid: None,
                registry_file: Some(PathBuf::from("sensors.toml")),
                dry_run: false,
            },
        );

        assert_eq!(config.device.vendor_id, "1a86");
        assert_eq!(config.device.product_id, "82E5");
        assert_eq!(config.registry.backend, RegistryBackend::File);
        assert_eq!(config.registry.path, Some(PathBuf::from("sensors.toml")));
    }

    #[test]
    fn test_dry_run_selects_memory_backend() {
        let config = apply_overrides(
            BridgeConfig::default(),
            RunArgs {
                dry_run: true,
                ..RunArgs::default()
            },
        );
        assert_eq!(config.registry.backend, RegistryBackend::Memory);
    }

    #[test]
    fn test_decode_capture_separates_rejected_frames() {
        let capture = b"--- WaKu-ctl Ready ---\r\n{\"client_id\":\"a\",\"data\":{\"FAN_0\":10}}\r\n{bad}\r\n{\"data\":{\"FAN_0\":20}}";

        let (records, mut rejected) = decode_capture(capture);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].client_id, "a");
        assert_eq!(records[1].data.fan0, 20);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, "{bad}");
        assert!(matches!(
            BridgeError::from(rejected.remove(0).1),
            BridgeError::Decode(_)
        ));
    }

    #[derive(Clone, Default)]
    struct RecordingWriter(Arc<std::sync::Mutex<Vec<String>>>);

    impl RecordingWriter {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl OutputWriter for RecordingWriter {
        fn write_ports(&self, _: &[crate::infrastructure::serial::PortListing]) -> Result<(), OutputError> {
            Ok(())
        }
        fn write_records(&self, _: &[TelemetryRecord]) -> Result<(), OutputError> {
            Ok(())
        }
        fn write_config(&self, _: &BridgeConfig) -> Result<(), OutputError> {
            Ok(())
        }
        fn write_message(&self, message: &str) -> Result<(), OutputError> {
            self.0.lock().unwrap().push(message.to_string());
            Ok(())
        }
        fn write_error(&self, _: &str) -> Result<(), OutputError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_forward_status_prints_label_changes() {
        let status = WatchStatus::new();
        let receiver = status.subscribe();
        let writer = RecordingWriter::default();

        status.set_status(LinkStatus::Connected);
        drop(status);

        forward_status(receiver, writer.clone()).await.unwrap();
        assert_eq!(writer.messages(), vec!["Device status: connected".to_string()]);
    }

    #[tokio::test]
    async fn test_forward_status_ignores_unchanged_label() {
        let status = WatchStatus::new();
        let receiver = status.subscribe();
        let writer = RecordingWriter::default();

        status.set_status(LinkStatus::NotConnected);
        drop(status);

        forward_status(receiver, writer.clone()).await.unwrap();
        assert!(writer.messages().is_empty());
    }
}
