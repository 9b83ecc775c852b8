//! The opaque carrier beneath message decode/encode (§4.11). This crate
//! owns the wire shapes and the dispatch onto the episode controller; it
//! never owns the socket, broker client, or reconnect policy against the
//! actual message bus — those live behind this trait, in whatever binary
//! wires a real deployment.

use crate::error::BusResult;

pub trait BusTransport {
    /// Block until the next raw message is available.
    fn recv(&self) -> BusResult<Vec<u8>>;

    /// Send a pre-encoded message. `topic` is metadata for the transport
    /// (routing, logging); the bytes are already a complete envelope
    /// produced by [`crate::messages::encode_status`] or similar.
    fn send(&self, topic: &str, bytes: &[u8]) -> BusResult<()>;
}

/// A line-delimited JSON transport over stdin/stdout: one envelope per
/// line. This is the reference transport for local development and the
/// end-to-end tests in this workspace; a real deployment swaps in a client
/// for whatever broker actually carries these messages (the camera
/// firmware's RT-message bus in the original system).
pub struct StdioBusTransport {
    stdin: std::sync::Mutex<std::io::BufReader<std::io::Stdin>>,
    stdout: std::sync::Mutex<std::io::Stdout>,
}

impl StdioBusTransport {
    pub fn new() -> Self {
        Self {
            stdin: std::sync::Mutex::new(std::io::BufReader::new(std::io::stdin())),
            stdout: std::sync::Mutex::new(std::io::stdout()),
        }
    }
}

impl Default for StdioBusTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl BusTransport for StdioBusTransport {
    fn recv(&self) -> BusResult<Vec<u8>> {
        use std::io::BufRead;
        let mut line = String::new();
        let mut stdin = self.stdin.lock().unwrap();
        let n = stdin
            .read_line(&mut line)
            .map_err(|e| crate::error::BusError::TransportUnavailable(e.to_string()))?;
        if n == 0 {
            return Err(crate::error::BusError::TransportUnavailable("stdin closed".to_string()));
        }
        Ok(line.into_bytes())
    }

    fn send(&self, _topic: &str, bytes: &[u8]) -> BusResult<()> {
        use std::io::Write;
        let mut stdout = self.stdout.lock().unwrap();
        stdout
            .write_all(bytes)
            .and_then(|_| stdout.write_all(b"\n"))
            .map_err(|e| crate::error::BusError::TransportUnavailable(e.to_string()))
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod fixture {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// A scripted transport that replays a fixed list of inbound messages
    /// and records everything sent outbound, for dispatch-loop tests.
    pub struct FixtureBusTransport {
        inbound: Mutex<VecDeque<Vec<u8>>>,
        outbound: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl FixtureBusTransport {
        pub fn new(inbound: Vec<Vec<u8>>) -> Self {
            Self {
                inbound: Mutex::new(inbound.into()),
                outbound: Mutex::new(Vec::new()),
            }
        }

        pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
            self.outbound.lock().unwrap().clone()
        }
    }

    impl BusTransport for FixtureBusTransport {
        fn recv(&self) -> BusResult<Vec<u8>> {
            self.inbound
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| crate::error::BusError::TransportUnavailable("no more fixture messages".to_string()))
        }

        fn send(&self, topic: &str, bytes: &[u8]) -> BusResult<()> {
            self.outbound.lock().unwrap().push((topic.to_string(), bytes.to_vec()));
            Ok(())
        }
    }
}
