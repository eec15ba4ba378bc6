use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rct_power_lib::value::ValueKind;
use std::time::Duration;

const DEFAULT_CATALOG_FILE: &str = "registers.yaml";

fn parse_register_id(s: &str) -> Result<u32, String> {
    clap_num::maybe_hex::<u32>(s).map_err(|e| format!("Invalid register id format: {e}"))
}

fn parse_value_kind(s: &str) -> Result<ValueKind, String> {
    match ValueKind::from_tag(s) {
        ValueKind::Unknown => Err(format!(
            "Unknown value kind '{s}' (expected: string, float, uint, bool)"
        )),
        kind => Ok(kind),
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommands {
    /// Read a single register and print its value.
    /// The value kind is looked up in the catalog; without a catalog entry
    /// (or with --kind) the payload is decoded as requested or printed raw.
    #[clap(verbatim_doc_comment)]
    Read {
        /// The 4-byte register id to poll.
        /// Can be specified in decimal or hexadecimal (e.g. "0x400F015B").
        #[arg(value_parser = parse_register_id, verbatim_doc_comment)]
        register_id: u32,

        /// Override the value kind declared in the catalog.
        /// One of: string, float, uint, bool.
        #[arg(long, value_parser = parse_value_kind, verbatim_doc_comment)]
        kind: Option<ValueKind>,
    },

    /// Read every register listed in the catalog and print one line per
    /// register as "description: value".
    ReadAll,

    /// Run in daemon mode: continuously poll all catalog registers at a fixed
    /// interval and print them to the standard output. After an exhausted
    /// retry budget the connection is re-established automatically.
    #[clap(verbatim_doc_comment)]
    Daemon {
        /// Interval between polling rounds (e.g. "10s", "1m").
        #[arg(value_parser = humantime::parse_duration, short, long, default_value = "30s")]
        poll_interval: Duration,
    },
}

const fn about_text() -> &'static str {
    "RCT Power inverter CLI - Poll telemetry registers from an RCT power-storage inverter over TCP."
}

#[derive(Parser, Debug)]
#[command(name="rctpoll", author, version, about=about_text(), long_about = None, propagate_version = true)]
pub struct CliArgs {
    /// Configure verbosity of logging output.
    /// -v for info, -vv for debug, -vvv for trace. Default is off.
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,

    /// The IP address or hostname and port of the inverter.
    /// Example: "192.168.43.175:8899".
    pub address: String,

    /// The command to execute against the device.
    #[command(subcommand)]
    pub command: CliCommands,

    /// Register catalog file (YAML) mapping register ids to kinds and
    /// descriptions.
    #[arg(global = true, long, default_value = DEFAULT_CATALOG_FILE)]
    pub catalog: String,

    /// Socket I/O timeout per request attempt.
    /// Examples: "1s", "500ms".
    #[arg(global = true, long, default_value = "2s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}
