//! A client library for polling telemetry registers from RCT Power
//! storage inverters over TCP.
//!
//! The inverter speaks a small proprietary request/response protocol on a
//! stream socket (usually port 8899): a read request names a 4-byte register
//! id, the device answers with the register payload, both directions guarded
//! by a CRC-16/CCITT checksum. This crate implements:
//!
//! - **Checksum**: the CCITT checksum variant used on the wire ([`checksum`]).
//! - **Frame codec**: request encoding and response validation with strict
//!   framing rules ([`protocol`]).
//! - **Value decoding**: a generic fixed-width float decoder ([`float`]) and
//!   kind-driven conversion of raw payloads ([`value`]).
//! - **Transport**: a blocking TCP client with a bounded retry loop and
//!   explicit reconnect ([`client`]).
//! - **Register catalog** (feature `serde`): YAML-backed lookup of register
//!   ids, kinds and descriptions ([`catalog`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use rct_power_lib::{
//!     client::RctPowerDevice,
//!     float::{self, FloatSpec},
//!     protocol,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut device = RctPowerDevice::connect("192.168.43.175:8899".parse()?)?;
//!     device.set_timeout(std::time::Duration::from_secs(2))?;
//!
//!     // Battery voltage is a float register.
//!     let raw = device.get(protocol::READ_COMMAND, 0x400F015B)?;
//!     let volts = float::decode(raw.to_u64()?, &FloatSpec::SINGLE)?;
//!     println!("Battery voltage: {volts} V");
//!     Ok(())
//! }
//! ```
//!
//! Write commands, concurrent requests on one connection and persistence of
//! retrieved values are out of scope.

pub mod checksum;
pub mod client;
pub mod float;
pub mod protocol;
pub mod value;

mod error;
pub use error::Error;

#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub mod catalog;
