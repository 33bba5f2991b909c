//! Transport layer for the volume/brightness control knob
//!
//! This crate owns everything between the serial port and a decoded reading:
//!
//! - `protocol`: wire constants and the line decoder
//! - `line`: byte stream to line framing
//! - `discovery`: port enumeration, handshake probing and reconnect backoff
//! - `native`: the `serialport`-backed implementation of the link traits
//!
//! Port access goes through the [`SerialBackend`] / [`SerialLink`] traits so
//! discovery and the driver loop can be exercised against scripted fakes.

pub mod discovery;
pub mod error;
pub mod line;
pub mod native;
pub mod protocol;

pub use discovery::{DeviceLocator, LocatorConfig, SerialEndpoint};
pub use error::TransportError;
pub use line::LineBuffer;
pub use native::{NativeBackend, NativeLink};
pub use protocol::{decode, is_handshake_line, ControlEvent, ControlKind};

use std::time::Duration;

/// An open serial connection that speaks in lines
pub trait SerialLink: Send {
    /// Write raw bytes to the device
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Read the next complete line, waiting up to the link's read timeout
    ///
    /// # Returns
    /// `None` if the timeout elapsed before a full line arrived
    fn read_line(&mut self) -> Result<Option<String>, TransportError>;

    /// Return a complete line only if one can be had without blocking
    fn poll_line(&mut self) -> Result<Option<String>, TransportError>;
}

/// Enumerates and opens serial ports
pub trait SerialBackend: Send {
    /// Names of all currently visible ports (e.g. `/dev/ttyACM0`)
    fn list_ports(&self) -> Result<Vec<String>, TransportError>;

    /// Open a port at `baud` with the given read timeout
    fn open(
        &self,
        port: &str,
        baud: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialLink>, TransportError>;
}
