//! Synchronous TCP client for the RCT Power inverter.
//!
//! The client owns the socket exclusively and runs fully blocking: connect,
//! send, receive and reconnect all block the calling thread. Exactly one
//! request is in flight at a time; callers sharing one client across threads
//! must serialize access themselves.

use crate::protocol::{self, RawValue};
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

/// Number of send/receive attempts per [`RctPowerDevice::get`] call before
/// the request fails with [`Error::ConnectionError`].
pub const RETRY_LIMIT: u32 = 5;

/// Upper bound for a single response read. Responses are small fixed-size
/// frames; the client performs one read per attempt and does not reassemble
/// fragmented messages.
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

/// Settle time applied twice during [`RctPowerDevice::reconnect`]: once
/// before closing the old socket and once before opening the new one. The
/// inverter keeps a dropped session half-open for several seconds; connecting
/// again too early is answered with resets.
pub const RECONNECT_SETTLE_DELAY: Duration = Duration::from_secs(10);

/// Errors surfaced by the TCP client.
///
/// Decode and socket errors during a request never escape directly; they feed
/// the retry loop and only [`Error::ConnectionError`] is returned once the
/// retry bound is exhausted.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Establishing the TCP connection failed. Fatal, not retried.
    #[error("cannot connect to {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// No valid response after the full retry budget. The caller must invoke
    /// [`RctPowerDevice::reconnect`] before issuing further requests.
    #[error("no valid response from the device after {0} attempts")]
    ConnectionError(u32),

    /// Wraps codec errors from [`crate::protocol`].
    #[error(transparent)]
    Protocol(#[from] crate::Error),

    /// Wraps socket-level errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Connection health, owned by the client and mutated only by its own
/// request/reconnect logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No usable socket; only seen mid-[`RctPowerDevice::reconnect`].
    Disconnected,
    /// Last exchange succeeded.
    Connected,
    /// One or more consecutive failed attempts, the retry bound not yet hit.
    Degraded(u32),
}

/// Client for reading telemetry registers from an RCT Power inverter.
///
/// Dropping the client closes the socket.
///
/// # Examples
///
/// ```no_run
/// use rct_power_lib::{client::RctPowerDevice, protocol};
///
/// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
/// let mut device = RctPowerDevice::connect("192.168.43.175:8899".parse()?)?;
/// let raw = device.get(protocol::READ_COMMAND, 0x400F015B)?;
/// println!("battery voltage raw: {:02X?}", raw.as_bytes());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RctPowerDevice {
    addr: SocketAddr,
    stream: TcpStream,
    state: ConnectionState,
    timeout: Option<Duration>,
}

impl RctPowerDevice {
    /// Connects to the inverter at `addr` (typically port 8899).
    ///
    /// A failed connect is fatal to construction; there is no retry here.
    pub fn connect(addr: SocketAddr) -> Result<Self, Error> {
        let stream = TcpStream::connect(addr)
            .map_err(|source| Error::ConnectFailed { addr, source })?;
        Ok(Self {
            addr,
            stream,
            state: ConnectionState::Connected,
            timeout: None,
        })
    }

    /// Sets the socket read/write timeout for each attempt.
    ///
    /// Without a timeout an attempt can block indefinitely on a silent
    /// device. The timeout survives [`RctPowerDevice::reconnect`].
    pub fn set_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
        self.stream.set_read_timeout(Some(timeout))?;
        self.stream.set_write_timeout(Some(timeout))?;
        self.timeout = Some(timeout);
        Ok(())
    }

    /// The configured socket timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Current connection health.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Requests the value of `register_id` and returns the raw payload.
    ///
    /// Sends the encoded frame and reads one response per attempt. Checksum
    /// mismatches, malformed responses and socket errors all count against
    /// the retry budget of [`RETRY_LIMIT`] sequential attempts on the same
    /// socket, with no delay in between. Once the budget is exhausted the
    /// call fails with [`Error::ConnectionError`] and the client stays
    /// degraded until [`RctPowerDevice::reconnect`] is called.
    pub fn get(&mut self, command: u8, register_id: u32) -> Result<RawValue, Error> {
        let frame = protocol::encode_read_request(command, register_id);
        let mut fails = 0u32;
        loop {
            match self.attempt(&frame) {
                Ok(raw) => {
                    self.state = ConnectionState::Connected;
                    return Ok(raw);
                }
                Err(error) => {
                    fails += 1;
                    self.state = ConnectionState::Degraded(fails);
                    log::warn!(
                        "Request for register {register_id:#010X} failed \
                         (attempt {fails}/{RETRY_LIMIT}): {error}"
                    );
                    if fails >= RETRY_LIMIT {
                        return Err(Error::ConnectionError(fails));
                    }
                }
            }
        }
    }

    /// One send/receive/decode round trip.
    fn attempt(&mut self, frame: &[u8]) -> Result<RawValue, Error> {
        self.stream.write_all(frame)?;
        let mut buffer = [0u8; RESPONSE_BUFFER_SIZE];
        let received = self.stream.read(&mut buffer)?;
        Ok(protocol::decode_response(&buffer[..received])?)
    }

    /// Tears down the current connection and establishes a fresh one.
    ///
    /// Sleeps [`RECONNECT_SETTLE_DELAY`] before closing the old socket and
    /// again before connecting the new one. The double wait gives the device
    /// time to notice the teardown on its side and must not be shortened.
    pub fn reconnect(&mut self) -> Result<(), Error> {
        std::thread::sleep(RECONNECT_SETTLE_DELAY);
        if let Err(error) = self.stream.shutdown(Shutdown::Both) {
            log::debug!("Shutdown of the stale connection failed: {error}");
        }
        self.state = ConnectionState::Disconnected;
        std::thread::sleep(RECONNECT_SETTLE_DELAY);
        self.stream = TcpStream::connect(self.addr).map_err(|source| Error::ConnectFailed {
            addr: self.addr,
            source,
        })?;
        if let Some(timeout) = self.timeout {
            self.stream.set_read_timeout(Some(timeout))?;
            self.stream.set_write_timeout(Some(timeout))?;
        }
        self.state = ConnectionState::Connected;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::crc16;
    use assert_matches::assert_matches;
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    fn make_response(request: &[u8], payload: &[u8]) -> Vec<u8> {
        // Echo the request header (without the start marker) back.
        let mut body = request[1..7].to_vec();
        body.extend_from_slice(payload);
        let checksum = crc16(&body);
        body.extend_from_slice(&checksum.to_be_bytes());
        body
    }

    #[test]
    fn get_returns_payload_and_resets_state() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let device = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; protocol::REQUEST_FRAME_LENGTH];
            socket.read_exact(&mut request).unwrap();
            assert_eq!(request[0], protocol::START_BYTE);
            let response = make_response(&request, &0x3F80_0000u32.to_be_bytes());
            socket.write_all(&response).unwrap();
        });

        let mut client = RctPowerDevice::connect(addr).unwrap();
        client.set_timeout(Duration::from_secs(1)).unwrap();
        let raw = client.get(protocol::READ_COMMAND, 0x400F015B).unwrap();
        assert_eq!(raw.to_u64().unwrap(), 0x3F80_0000);
        assert_eq!(client.state(), ConnectionState::Connected);
        device.join().unwrap();
    }

    #[test]
    fn recovers_after_corrupted_response() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let device = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; protocol::REQUEST_FRAME_LENGTH];

            // First attempt: corrupted checksum.
            socket.read_exact(&mut request).unwrap();
            let mut response = make_response(&request, &[0x00, 0x00, 0x00, 0x01]);
            let last = response.len() - 1;
            response[last] ^= 0xFF;
            socket.write_all(&response).unwrap();

            // Second attempt: valid.
            socket.read_exact(&mut request).unwrap();
            let response = make_response(&request, &[0x00, 0x00, 0x00, 0x01]);
            socket.write_all(&response).unwrap();
        });

        let mut client = RctPowerDevice::connect(addr).unwrap();
        client.set_timeout(Duration::from_secs(1)).unwrap();
        let raw = client.get(protocol::READ_COMMAND, 0x0000_0001).unwrap();
        assert_eq!(raw.to_u64().unwrap(), 1);
        assert_eq!(client.state(), ConnectionState::Connected);
        device.join().unwrap();
    }

    #[test]
    fn retry_budget_is_exactly_five_attempts() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (attempts_tx, attempts_rx) = mpsc::channel();
        let device = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut attempts = 0u32;
            let mut request = [0u8; protocol::REQUEST_FRAME_LENGTH];
            while socket.read_exact(&mut request).is_ok() {
                attempts += 1;
                let mut response = make_response(&request, &[0x00]);
                response[0] ^= 0x40; // breaks the checksum
                socket.write_all(&response).unwrap();
            }
            attempts_tx.send(attempts).unwrap();
        });

        let mut client = RctPowerDevice::connect(addr).unwrap();
        client.set_timeout(Duration::from_secs(1)).unwrap();
        assert_matches!(
            client.get(protocol::READ_COMMAND, 0x400F015B),
            Err(Error::ConnectionError(RETRY_LIMIT))
        );
        assert_eq!(client.state(), ConnectionState::Degraded(RETRY_LIMIT));
        drop(client); // closes the socket, ends the device loop
        assert_eq!(attempts_rx.recv().unwrap(), RETRY_LIMIT);
        device.join().unwrap();
    }

    #[test]
    fn short_responses_count_against_the_budget() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let device = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; protocol::REQUEST_FRAME_LENGTH];
            while socket.read_exact(&mut request).is_ok() {
                socket.write_all(&[0xAB, 0xCD]).unwrap();
            }
        });

        let mut client = RctPowerDevice::connect(addr).unwrap();
        client.set_timeout(Duration::from_secs(1)).unwrap();
        assert_matches!(
            client.get(protocol::READ_COMMAND, 0x400F015B),
            Err(Error::ConnectionError(RETRY_LIMIT))
        );
        drop(client);
        device.join().unwrap();
    }

    #[test]
    fn connect_to_closed_port_fails_fatally() {
        // Bind then drop to obtain a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert_matches!(
            RctPowerDevice::connect(addr),
            Err(Error::ConnectFailed { .. })
        );
    }
}
