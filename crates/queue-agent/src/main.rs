use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::{EngineSettings, QueuePrinterEngine, SessionTimeouts};
use domain::{DeviceAddress, DomainError};
use infrastructure::config::{AgentConfig, RadioKind, StorageKind};
use infrastructure::{RadioFactory, open_store};

#[derive(Parser, Debug)]
#[command(author, version, about = "Queue number printer for Bluetooth thermal printers")]
struct Args {
    /// Path to config directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Override storage backend (sqlite, memory)
    #[arg(long)]
    store: Option<String>,

    /// Override radio backend (serial, simulated)
    #[arg(long)]
    radio: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue the next number of a counter and print it
    Next { counter: String },
    /// Print the last issued number again
    Reprint { counter: String },
    /// Set a counter back to zero
    Reset { counter: String },
    /// Print an already issued number, or show the range if none is given
    Pick { counter: String, number: Option<i64> },
    /// Show counters and the selected printer
    Status,
    /// List paired devices, optionally scanning for nearby ones
    Devices {
        /// Scan for this many seconds
        #[arg(long)]
        scan: Option<u64>,
    },
    /// Select the printer to use
    Select {
        address: String,
        /// Scan for this many seconds before selecting
        #[arg(long)]
        scan: Option<u64>,
    },
    /// Print a ticket without touching any counter
    Print { label: String, number: u32 },
}

fn apply_overrides(config: &mut AgentConfig, args: &Args) -> Result<()> {
    if let Some(store) = &args.store {
        config.storage.kind = match store.as_str() {
            "sqlite" => StorageKind::Sqlite,
            "memory" => StorageKind::Memory,
            other => anyhow::bail!("Unknown storage backend: {}", other),
        };
    }
    if let Some(radio) = &args.radio {
        config.radio.kind = match radio.as_str() {
            "serial" => RadioKind::Serial,
            "simulated" => RadioKind::Simulated,
            other => anyhow::bail!("Unknown radio backend: {}", other),
        };
    }
    Ok(())
}

/// Human-readable hint for errors the operator can fix
fn describe(error: &DomainError) -> String {
    if error.needs_user_action() {
        format!("{} (check Bluetooth settings and try again)", error)
    } else {
        error.to_string()
    }
}

async fn scan_for(engine: &QueuePrinterEngine, secs: u64) -> Result<()> {
    engine.start_scan().await?;
    info!(secs, "🔍 Scanning for printers...");
    if tokio::time::timeout(Duration::from_secs(secs), engine.wait_for_scan())
        .await
        .is_err()
    {
        engine.cancel_scan().await?;
    }
    Ok(())
}

async fn execute(engine: &QueuePrinterEngine, command: Command, as_json: bool) -> Result<()> {
    match command {
        Command::Next { counter } => {
            let id = engine.counter_id(&counter)?;
            let issued = engine.advance_counter(&id).await?;
            if as_json {
                println!(
                    "{}",
                    json!({
                        "counter": issued.counter.as_str(),
                        "number": issued.number,
                        "printed": issued.print.is_ok(),
                        "error": issued.print.as_ref().err().map(|e| e.to_string()),
                    })
                );
            } else {
                match &issued.print {
                    Ok(receipt) => println!(
                        "Issued {} #{} on {}",
                        counter, issued.number, receipt.address
                    ),
                    Err(e) => println!(
                        "Issued {} #{} but printing failed: {}",
                        counter,
                        issued.number,
                        describe(e)
                    ),
                }
            }
        }
        Command::Reprint { counter } => {
            let id = engine.counter_id(&counter)?;
            let receipt = engine.reprint_last(&id).await?;
            if as_json {
                println!("{}", json!({ "counter": id.as_str(), "bytes": receipt.bytes_sent }));
            } else {
                println!("Reprinted last {} ticket on {}", counter, receipt.address);
            }
        }
        Command::Reset { counter } => {
            let id = engine.counter_id(&counter)?;
            engine.reset_counter(&id).await?;
            if as_json {
                println!("{}", json!({ "counter": id.as_str(), "current": 0 }));
            } else {
                println!("{} reset to 0", counter);
            }
        }
        Command::Pick { counter, number } => {
            let id = engine.counter_id(&counter)?;
            match number {
                Some(number) => {
                    let receipt = engine.pick_and_print(&id, number).await?;
                    if as_json {
                        println!(
                            "{}",
                            json!({ "counter": id.as_str(), "number": number, "bytes": receipt.bytes_sent })
                        );
                    } else {
                        println!("Printed {} #{} on {}", counter, number, receipt.address);
                    }
                }
                None => {
                    let range = engine.pick_range(&id).await?;
                    if as_json {
                        println!(
                            "{}",
                            json!({ "counter": id.as_str(), "min": range.start(), "max": range.end() })
                        );
                    } else {
                        println!("{} can print {}..={}", counter, range.start(), range.end());
                    }
                }
            }
        }
        Command::Status => {
            let counters = engine.counters().await;
            let binding = engine.current_binding().await;
            if as_json {
                let counters: Vec<_> = counters
                    .iter()
                    .map(|(spec, counter)| {
                        json!({
                            "id": spec.id.as_str(),
                            "label": spec.label,
                            "current": counter.current(),
                            "last_printed": counter.last_printed(),
                        })
                    })
                    .collect();
                println!("{}", json!({ "counters": counters, "printer": binding }));
            } else {
                for (spec, counter) in &counters {
                    println!(
                        "{:<8} current {:>4}  last printed {:>4}",
                        spec.label,
                        counter.current(),
                        counter.last_printed()
                    );
                }
                match binding {
                    Some(binding) => println!("Printer: {}", binding.describe()),
                    None => println!("Printer: none selected"),
                }
            }
        }
        Command::Devices { scan } => {
            engine.snapshot_bonded().await?;
            if let Some(secs) = scan {
                scan_for(engine, secs).await?;
            }
            let snapshot = engine.list_devices().await;
            if as_json {
                println!("{}", json!({ "devices": snapshot.devices }));
            } else if snapshot.devices.is_empty() {
                println!("No devices found");
            } else {
                for record in &snapshot.devices {
                    println!("{}", record.label());
                }
            }
        }
        Command::Select { address, scan } => {
            let address = DeviceAddress::new(address)?;
            engine.snapshot_bonded().await?;
            if let Some(secs) = scan {
                scan_for(engine, secs).await?;
            }
            let binding = engine.select_device(&address).await?;
            if as_json {
                println!("{}", json!({ "printer": binding }));
            } else {
                println!("Selected {}", binding.describe());
            }
        }
        Command::Print { label, number } => {
            let receipt = engine.print_ticket(&label, number).await?;
            if as_json {
                println!("{}", json!({ "bytes": receipt.bytes_sent }));
            } else {
                println!("Printed {} #{} on {}", label, number, receipt.address);
            }
        }
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,queue_agent=debug,application=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    // Running from the workspace root during development
    let dev_config = "crates/queue-agent/config";
    let config_dir = if !std::path::Path::new(&args.config_dir).exists()
        && std::path::Path::new(dev_config).exists()
    {
        dev_config.to_string()
    } else {
        args.config_dir.clone()
    };
    info!("📂 Config directory: {}", config_dir);

    let mut config = AgentConfig::load(&config_dir).context("Failed to load configuration")?;
    apply_overrides(&mut config, &args)?;

    let store = open_store(&config.storage).await?;
    let radio = RadioFactory::create(&config.radio);

    let settings = EngineSettings {
        counters: config.counters.clone(),
        layout: config.ticket.clone(),
        timeouts: SessionTimeouts {
            connect: Duration::from_secs(config.session.connect_timeout_secs),
            send: Duration::from_secs(config.session.send_timeout_secs),
        },
    };
    let engine = QueuePrinterEngine::start(store, radio, settings).await?;

    if let Err(e) = execute(&engine, args.command, args.json).await {
        if let Some(domain_error) = e.downcast_ref::<DomainError>() {
            warn!(error = %domain_error, "Command failed");
            anyhow::bail!(describe(domain_error));
        }
        return Err(e);
    }
    Ok(())
}

fn main() {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(run()) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}
