//! RCT Power inverter CLI
//!
//! A command-line tool for polling telemetry registers from RCT Power
//! storage inverters over TCP.
//!
//! This tool allows users to:
//! - Read a single register by id, decoded via the register catalog.
//! - Read all registers listed in the catalog in one pass.
//! - Run in a continuous daemon mode that polls the catalog registers at a
//!   fixed interval and prints them to the console, reconnecting after
//!   connection failures.
//!
//! The CLI leverages the `rct_power_lib` crate for protocol definitions and
//! client operations.

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use log::*;
use rct_power_lib::{
    catalog::Catalog,
    client::RctPowerDevice,
    protocol, value,
    value::ValueKind,
};
use std::panic;

mod commandline;

fn logging_init(loglevel: LevelFilter) -> LoggerHandle {
    let log_handle = Logger::try_with_env_or_str(loglevel.as_str())
        .expect("Cannot init logging")
        .start()
        .expect("Cannot start logging");

    panic::set_hook(Box::new(|panic_info| {
        let (filename, line, column) = panic_info
            .location()
            .map(|loc| (loc.file(), loc.line(), loc.column()))
            .unwrap_or(("<unknown_file>", 0, 0));

        let cause_str = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            *s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.as_str()
        } else {
            "<unknown_panic_cause>"
        };

        error!(
            target: "panic",
            "Thread '{}' panicked at '{}': {}:{} - Cause: {}",
            std::thread::current().name().unwrap_or("<unnamed>"),
            filename,
            line,
            column,
            cause_str
        );
    }));
    log_handle
}

/// Loads the catalog file, failing if it is missing or malformed.
fn load_catalog(path: &str) -> Result<Catalog> {
    let catalog = Catalog::from_yaml_file(path)
        .with_context(|| format!("Cannot load register catalog {path}"))?;
    debug!("Loaded {} register descriptors from {path}", catalog.len());
    Ok(catalog)
}

/// Loads the catalog file if present; commands that can work without one fall
/// back to raw output.
fn try_load_catalog(path: &str) -> Option<Catalog> {
    match Catalog::from_yaml_file(path) {
        Ok(catalog) => {
            debug!("Loaded {} register descriptors from {path}", catalog.len());
            Some(catalog)
        }
        Err(error) => {
            debug!("No usable register catalog at {path}: {error}");
            None
        }
    }
}

/// Polls one register and prints "description: value".
fn poll_register(
    client: &mut RctPowerDevice,
    id: u32,
    kind: ValueKind,
    description: &str,
) -> Result<()> {
    let raw = client
        .get(protocol::READ_COMMAND, id)
        .with_context(|| format!("Cannot read register {id:#010X}"))?;
    match value::convert(&raw, kind) {
        Ok(decoded) => println!("{description}: {decoded}"),
        // A payload that does not fit its declared kind is still worth seeing.
        Err(error) => {
            warn!("Register {id:#010X} did not decode as {kind:?}: {error}");
            println!("{description}: {:02X?}", raw.as_bytes());
        }
    }
    Ok(())
}

/// Reads every register in the catalog once.
fn poll_catalog(client: &mut RctPowerDevice, catalog: &Catalog) -> Result<()> {
    for descriptor in catalog.iter() {
        poll_register(client, descriptor.id, descriptor.kind, &descriptor.description)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = commandline::CliArgs::parse();

    let _log_handle = logging_init(args.verbose.log_level_filter());
    info!(
        "RCT Power CLI started. Log level: {}",
        args.verbose.log_level_filter()
    );

    let socket_addr = args
        .address
        .parse()
        .with_context(|| format!("Invalid TCP address format: '{}'", args.address))?;
    info!("Attempting to connect via TCP to {socket_addr}...");
    let mut client = RctPowerDevice::connect(socket_addr)
        .with_context(|| format!("Failed to connect to RCT Power device at {socket_addr}"))?;
    client
        .set_timeout(args.timeout)
        .context("Cannot apply socket timeout")?;

    match &args.command {
        commandline::CliCommands::Read { register_id, kind } => {
            info!("Executing: Read register {register_id:#010X}");
            let catalog = try_load_catalog(&args.catalog);
            let descriptor = catalog.as_ref().and_then(|c| c.by_id(*register_id));
            let kind = (*kind)
                .or(descriptor.map(|d| d.kind))
                .unwrap_or(ValueKind::Unknown);
            let description = descriptor
                .map(|d| d.description.clone())
                .unwrap_or_else(|| format!("{register_id:#010X}"));
            poll_register(&mut client, *register_id, kind, &description)?;
        }
        commandline::CliCommands::ReadAll => {
            info!("Executing: Read All Catalog Registers");
            let catalog = load_catalog(&args.catalog)?;
            poll_catalog(&mut client, &catalog)?;
        }
        commandline::CliCommands::Daemon { poll_interval } => {
            info!("Starting daemon mode: interval={poll_interval:?}");
            let catalog = load_catalog(&args.catalog)?;
            loop {
                debug!("Daemon: polling {} registers...", catalog.len());
                if let Err(error) = poll_catalog(&mut client, &catalog) {
                    warn!("Polling round failed: {error:#}");
                    info!("Re-establishing the device connection...");
                    client
                        .reconnect()
                        .context("Reconnect after exhausted retries failed")?;
                }
                std::thread::sleep(*poll_interval);
            }
        }
    }

    Ok(())
}
