//! `serialport`-backed link implementation

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::TransportError;
use crate::line::LineBuffer;
use crate::{SerialBackend, SerialLink};

/// Read chunk size; the device sends a handful of bytes per line
const READ_CHUNK: usize = 256;

/// Enumerates ports through the OS
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SerialBackend for NativeBackend {
    fn list_ports(&self) -> Result<Vec<String>, TransportError> {
        let ports = serialport::available_ports()?;
        if ports.is_empty() {
            return Err(TransportError::NoPorts);
        }
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    fn open(
        &self,
        port: &str,
        baud: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialLink>, TransportError> {
        let port = serialport::new(port, baud).timeout(timeout).open()?;
        Ok(Box::new(NativeLink::new(port)))
    }
}

/// An open OS serial port plus its line buffer
pub struct NativeLink {
    port: Box<dyn serialport::SerialPort>,
    lines: LineBuffer,
}

impl NativeLink {
    pub fn new(port: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            port,
            lines: LineBuffer::new(),
        }
    }

    /// Read whatever is available (blocking up to the port timeout) into the buffer.
    ///
    /// Returns `false` if the read timed out.
    fn fill(&mut self, max: usize) -> Result<bool, TransportError> {
        let mut chunk = [0u8; READ_CHUNK];
        let len = max.clamp(1, READ_CHUNK);
        match self.port.read(&mut chunk[..len]) {
            Ok(0) => Err(TransportError::Disconnected),
            Ok(n) => {
                trace!("read {} bytes: {:02X?}", n, &chunk[..n]);
                self.lines.push(&chunk[..n]);
                Ok(true)
            }
            Err(e) => {
                let err = TransportError::from(e);
                if err.is_timeout() {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }
}

impl SerialLink for NativeLink {
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    /// The port timeout bounds the whole call, not each read: a port that
    /// streams bytes without ever sending a newline still gives up in time.
    fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        let deadline = Instant::now() + self.port.timeout();
        loop {
            if let Some(line) = self.lines.pop_line() {
                return Ok(Some(line));
            }
            if Instant::now() >= deadline {
                trace!("no complete line within {:?}", self.port.timeout());
                return Ok(None);
            }
            if !self.fill(READ_CHUNK)? {
                return Ok(None);
            }
        }
    }

    fn poll_line(&mut self) -> Result<Option<String>, TransportError> {
        if let Some(line) = self.lines.pop_line() {
            return Ok(Some(line));
        }
        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(None);
        }
        self.fill(available)?;
        Ok(self.lines.pop_line())
    }
}
