//! headset-battery CLI: battery status and device diagnostics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use headset_battery_core::config::Settings;
use headset_battery_core::engine::BatteryQueryEngine;
use headset_battery_core::hid::HidApiBackend;
use headset_battery_core::poller::BatteryPoller;
use headset_battery_core::reading::BatteryReading;
use headset_battery_core::selector::DiagnosticRow;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "headset-battery",
    version,
    about = "Battery level of HyperX / Kingston wireless headsets"
)]
struct Cli {
    /// JSON settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Response read timeout in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u32>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the battery once.
    Status,
    /// Query now and then periodically.
    Watch {
        /// Seconds between queries.
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many readings.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },
    /// List every HID interface of the connected headset.
    List,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load_or_default(self.config.as_deref())?;
        if let Some(ms) = self.timeout_ms {
            settings.read_timeout_ms = ms;
        }
        if let Commands::Watch {
            interval: Some(secs),
            ..
        } = self.command
        {
            settings.poll_interval_secs = secs;
        }
        Ok(settings.validate()?)
    }
}

fn print_reading(reading: &BatteryReading, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string(reading).context("serialize reading")?
        );
    } else {
        println!("{reading}");
    }
    Ok(())
}

/// `status` exits non-zero unless the headset reported a charge level.
fn exit_code(reading: &BatteryReading) -> ExitCode {
    if reading.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_rows(rows: &[DiagnosticRow], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(rows).context("serialize device list")?
        );
        return Ok(());
    }

    if rows.is_empty() {
        println!("No supported headset found.");
        println!("Ensure the dongle is plugged in and HID access is permitted.");
        return Ok(());
    }

    for row in rows {
        println!(
            "VID: {}  PID: {}  usage: 0x{:04X}  page: 0x{:04X}  {} {}",
            row.vid, row.pid, row.usage, row.usage_page, row.manufacturer, row.product
        );
        println!("    {}", row.path_short());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let engine =
        BatteryQueryEngine::new(HidApiBackend::new()).with_read_timeout(settings.read_timeout_ms);
    let poller = BatteryPoller::new(engine);

    match cli.command {
        Commands::Status => {
            let reading = poller.read().await;
            print_reading(&reading, cli.json)?;
            return Ok(exit_code(&reading));
        }
        Commands::Watch { count, .. } => {
            let period = Duration::from_secs(settings.poll_interval_secs);
            let mut seen = 0u64;
            let mut failure = None;
            poller
                .watch(period, |reading| {
                    if let Err(e) = print_reading(reading, cli.json) {
                        failure = Some(e);
                        return ControlFlow::Break(());
                    }
                    seen += 1;
                    match count {
                        Some(n) if seen >= n => ControlFlow::Break(()),
                        _ => ControlFlow::Continue(()),
                    }
                })
                .await;
            if let Some(e) = failure {
                return Err(e);
            }
        }
        Commands::List => {
            let rows = poller.engine().list_devices()?;
            print_rows(&rows, cli.json)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
