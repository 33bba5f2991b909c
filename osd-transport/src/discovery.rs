//! Device discovery for the control knob
//!
//! The board can show up on any serial port, and unrelated serial devices
//! are common, so a port only counts once it has produced a protocol-shaped
//! line. Discovery never gives up: an empty round is the normal "searching"
//! state and simply waits out the backoff before enumerating again.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::TransportError;
use crate::protocol::{self, link};
use crate::{SerialBackend, SerialLink};

/// Discovery timing and probe parameters
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Baud rate used for every port
    pub baud_rate: u32,
    /// Per-read timeout while probing (also kept on the accepted link)
    pub read_timeout: Duration,
    /// Pause after opening, boards that reset on DTR need it to boot
    pub settle_delay: Duration,
    /// Lines read from a port before rejecting it
    pub probe_lines: usize,
    /// Sleep between full enumeration rounds
    pub retry_backoff: Duration,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            baud_rate: link::BAUD_RATE,
            read_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_secs(1),
            probe_lines: 4,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// A validated connection to the device
pub struct SerialEndpoint {
    port_name: String,
    link: Box<dyn SerialLink>,
}

impl SerialEndpoint {
    pub fn new(port_name: impl Into<String>, link: Box<dyn SerialLink>) -> Self {
        Self {
            port_name: port_name.into(),
            link,
        }
    }

    /// OS name of the port this endpoint is bound to
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Next complete line if one is available without blocking
    pub fn poll_line(&mut self) -> Result<Option<String>, TransportError> {
        self.link.poll_line()
    }
}

impl std::fmt::Debug for SerialEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialEndpoint")
            .field("port_name", &self.port_name)
            .finish_non_exhaustive()
    }
}

/// Finds the device among the visible serial ports
pub struct DeviceLocator<B: SerialBackend> {
    backend: B,
    config: LocatorConfig,
}

impl<B: SerialBackend> DeviceLocator<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, LocatorConfig::default())
    }

    pub fn with_config(backend: B, config: LocatorConfig) -> Self {
        Self { backend, config }
    }

    /// Block until a device answers the handshake.
    ///
    /// Retries forever; only process termination interrupts it.
    pub fn discover(&self) -> SerialEndpoint {
        info!("Searching for control device...");
        let mut round: u64 = 0;
        loop {
            round += 1;
            if let Some(endpoint) = self.scan_once() {
                info!(
                    "Control device found on {} (round {})",
                    endpoint.port_name(),
                    round
                );
                return endpoint;
            }
            info!(
                "No device answered, retrying in {:?}",
                self.config.retry_backoff
            );
            std::thread::sleep(self.config.retry_backoff);
        }
    }

    /// One enumeration round. Returns the first port that validates.
    ///
    /// Rejected ports are closed as soon as their probe ends.
    pub fn scan_once(&self) -> Option<SerialEndpoint> {
        let ports = match self.backend.list_ports() {
            Ok(ports) => ports,
            Err(e) => {
                debug!("Port enumeration failed: {}", e);
                return None;
            }
        };

        for port in ports {
            match self.probe(&port) {
                Ok(Some(link)) => return Some(SerialEndpoint::new(port, link)),
                Ok(None) => debug!("{}: no handshake", port),
                Err(e) => debug!("{}: probe failed: {}", port, e),
            }
        }
        None
    }

    /// Open a port, poke it and wait for a protocol-shaped line
    fn probe(&self, port: &str) -> Result<Option<Box<dyn SerialLink>>, TransportError> {
        let mut link = self
            .backend
            .open(port, self.config.baud_rate, self.config.read_timeout)?;

        if !self.config.settle_delay.is_zero() {
            std::thread::sleep(self.config.settle_delay);
        }
        link.write_all(link::PROBE)?;

        for _ in 0..self.config.probe_lines {
            if let Some(line) = link.read_line()? {
                if protocol::is_handshake_line(&line) {
                    debug!("{}: handshake line {:?}", port, line);
                    return Ok(Some(link));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Port that replays a fixed script of read results
    struct ScriptedLink {
        reads: VecDeque<Result<Option<String>, TransportError>>,
        closed: Arc<Mutex<Vec<String>>>,
        name: String,
    }

    impl SerialLink for ScriptedLink {
        fn write_all(&mut self, _data: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }

        fn read_line(&mut self) -> Result<Option<String>, TransportError> {
            self.reads.pop_front().unwrap_or(Ok(None))
        }

        fn poll_line(&mut self) -> Result<Option<String>, TransportError> {
            self.read_line()
        }
    }

    impl Drop for ScriptedLink {
        fn drop(&mut self) {
            self.closed.lock().unwrap().push(self.name.clone());
        }
    }

    /// Backend whose ports stay silent until `valid_from_round`
    struct FakeBackend {
        ports: Vec<&'static str>,
        device_port: &'static str,
        valid_from_round: usize,
        rounds: Mutex<usize>,
        opens: Mutex<Vec<String>>,
        closed: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        fn new(ports: Vec<&'static str>, device_port: &'static str, valid_from_round: usize) -> Self {
            Self {
                ports,
                device_port,
                valid_from_round,
                rounds: Mutex::new(0),
                opens: Mutex::new(Vec::new()),
                closed: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl SerialBackend for FakeBackend {
        fn list_ports(&self) -> Result<Vec<String>, TransportError> {
            *self.rounds.lock().unwrap() += 1;
            Ok(self.ports.iter().map(|p| p.to_string()).collect())
        }

        fn open(
            &self,
            port: &str,
            _baud: u32,
            _timeout: Duration,
        ) -> Result<Box<dyn SerialLink>, TransportError> {
            self.opens.lock().unwrap().push(port.to_string());
            if port == "/dev/ttyBUSY" {
                return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into());
            }
            let round = *self.rounds.lock().unwrap();
            let reads = if port == self.device_port && round >= self.valid_from_round {
                vec![Ok(Some("garbage".to_string())), Ok(Some("V:12".to_string()))]
            } else {
                vec![Ok(Some("AT OK".to_string())), Ok(None), Ok(Some(String::new()))]
            };
            Ok(Box::new(ScriptedLink {
                reads: reads.into(),
                closed: Arc::clone(&self.closed),
                name: port.to_string(),
            }))
        }
    }

    fn fast_config() -> LocatorConfig {
        LocatorConfig {
            settle_delay: Duration::ZERO,
            retry_backoff: Duration::ZERO,
            ..LocatorConfig::default()
        }
    }

    #[test]
    fn test_default_config_matches_firmware() {
        let cfg = LocatorConfig::default();
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.probe_lines, 4);
        assert_eq!(cfg.retry_backoff, Duration::from_secs(2));
    }

    #[test]
    fn test_discover_retries_until_device_answers() {
        let backend = FakeBackend::new(vec!["/dev/ttyS0", "/dev/ttyACM0"], "/dev/ttyACM0", 4);
        let locator = DeviceLocator::with_config(backend, fast_config());

        let endpoint = locator.discover();
        assert_eq!(endpoint.port_name(), "/dev/ttyACM0");
        assert_eq!(*locator.backend.rounds.lock().unwrap(), 4);
    }

    #[test]
    fn test_rejected_ports_are_closed() {
        let backend = FakeBackend::new(vec!["/dev/ttyS0", "/dev/ttyS1"], "/dev/ttyACM0", 1);
        let locator = DeviceLocator::with_config(backend, fast_config());

        assert!(locator.scan_once().is_none());
        let closed = locator.backend.closed.lock().unwrap().clone();
        assert_eq!(closed, vec!["/dev/ttyS0", "/dev/ttyS1"]);
    }

    #[test]
    fn test_open_failure_only_rejects_that_port() {
        let backend = FakeBackend::new(vec!["/dev/ttyBUSY", "/dev/ttyACM0"], "/dev/ttyACM0", 1);
        let locator = DeviceLocator::with_config(backend, fast_config());

        let endpoint = locator.scan_once().expect("device on second port");
        assert_eq!(endpoint.port_name(), "/dev/ttyACM0");
    }

    #[test]
    fn test_stops_probing_after_acceptance() {
        let backend = FakeBackend::new(
            vec!["/dev/ttyACM0", "/dev/ttyACM1", "/dev/ttyACM2"],
            "/dev/ttyACM0",
            1,
        );
        let locator = DeviceLocator::with_config(backend, fast_config());

        locator.scan_once().expect("device on first port");
        assert_eq!(*locator.backend.opens.lock().unwrap(), vec!["/dev/ttyACM0"]);
    }

    #[test]
    fn test_handshake_must_arrive_within_probe_lines() {
        struct LateBackend;
        impl SerialBackend for LateBackend {
            fn list_ports(&self) -> Result<Vec<String>, TransportError> {
                Ok(vec!["/dev/ttyUSB0".to_string()])
            }
            fn open(
                &self,
                _port: &str,
                _baud: u32,
                _timeout: Duration,
            ) -> Result<Box<dyn SerialLink>, TransportError> {
                let mut reads: VecDeque<_> = (0..4).map(|_| Ok(None)).collect();
                reads.push_back(Ok(Some(link::READY_MARKER.to_string())));
                Ok(Box::new(ScriptedLink {
                    reads,
                    closed: Arc::new(Mutex::new(Vec::new())),
                    name: "late".into(),
                }))
            }
        }

        let locator = DeviceLocator::with_config(LateBackend, fast_config());
        assert!(locator.scan_once().is_none());
    }

    #[test]
    fn test_read_error_mid_probe_rejects_port() {
        struct FlakyBackend;
        impl SerialBackend for FlakyBackend {
            fn list_ports(&self) -> Result<Vec<String>, TransportError> {
                Ok(vec!["/dev/ttyUSB0".to_string()])
            }
            fn open(
                &self,
                _port: &str,
                _baud: u32,
                _timeout: Duration,
            ) -> Result<Box<dyn SerialLink>, TransportError> {
                let reads = VecDeque::from(vec![
                    Err(TransportError::Disconnected),
                    Ok(Some("V:1".to_string())),
                ]);
                Ok(Box::new(ScriptedLink {
                    reads,
                    closed: Arc::new(Mutex::new(Vec::new())),
                    name: "flaky".into(),
                }))
            }
        }

        let locator = DeviceLocator::with_config(FlakyBackend, fast_config());
        assert!(locator.scan_once().is_none());
    }
}
