// cdcbridge - USB CDC telemetry bridge
use anyhow::Context;
use cdcbridge::cli::{execute_command, Args};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    execute_command(args).await.context("cdcbridge failed")?;
    Ok(())
}
