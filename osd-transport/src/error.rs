//! Transport error types

use thiserror::Error;

/// Errors that can occur while talking to the control device
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Device disconnected")]
    Disconnected,

    #[error("No serial ports available")]
    NoPorts,
}

impl TransportError {
    /// True for errors that only mean "nothing arrived in time".
    ///
    /// Serial reads with a timeout surface this as `TimedOut` (or
    /// `WouldBlock` on some platforms); neither ends a session.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let e = TransportError::from(std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert!(e.is_timeout());
        let e = TransportError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(!e.is_timeout());
        assert!(!TransportError::Disconnected.is_timeout());
    }
}
