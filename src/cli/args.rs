use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments for cdcbridge
#[derive(Parser, Debug)]
#[command(
    name = "cdcbridge",
    version = env!("CARGO_PKG_VERSION"),
    about = "USB CDC telemetry bridge",
    long_about = "Reads JSON telemetry from a USB serial device and publishes temperature and fan sensors to a host sensor registry, reconnecting automatically when the device is unplugged."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bridge until interrupted
    Run(RunArgs),
    /// List available serial ports
    List,
    /// Extract and decode telemetry frames from a captured byte stream
    Decode {
        /// Capture file, or `-` for stdin
        input: String,
    },
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Bridge run arguments
#[derive(ClapArgs, Debug, Default)]
pub struct RunArgs {
    /// USB vendor id (hex), overrides the configuration
    #[arg(long)]
    pub vid: Option<String>,

    /// USB product id (hex), overrides the configuration
    #[arg(long)]
    pub pid: Option<String>,

    /// Write sensors to this TOML file instead of the configured backend
    #[arg(long)]
    pub registry_file: Option<PathBuf>,

    /// Keep sensors in memory only
    #[arg(long, conflicts_with = "registry_file")]
    pub dry_run: bool,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Create a project configuration
    Init {
        /// Project directory (defaults to the current directory)
        path: Option<PathBuf>,
    },
}
