//! Wire protocol for the control knob
//!
//! The device speaks newline-terminated ASCII at a fixed baud rate:
//!
//! ```text
//! ARDUINO_INICIADO      sent once after boot
//! V:42                  volume potentiometer moved to 42 %
//! B:87                  brightness potentiometer moved to 87 %
//! ```
//!
//! There is no checksum and no framing beyond the newline, so anything that
//! does not parse is treated as line noise and dropped.

use std::fmt;

/// Serial link parameters
pub mod link {
    /// Fixed baud rate of the device firmware
    pub const BAUD_RATE: u32 = 9600;
    /// Literal line the firmware prints once it is ready
    pub const READY_MARKER: &str = "ARDUINO_INICIADO";
    /// Probe written to a freshly opened port
    pub const PROBE: &[u8] = b"\n";
}

/// Line prefixes
pub mod prefix {
    pub const VOLUME: &str = "V:";
    pub const BRIGHTNESS: &str = "B:";
}

/// Which control a reading belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Volume,
    Brightness,
}

impl ControlKind {
    /// Wire prefix for this control
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Volume => prefix::VOLUME,
            Self::Brightness => prefix::BRIGHTNESS,
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Volume => write!(f, "volume"),
            Self::Brightness => write!(f, "brightness"),
        }
    }
}

/// One decoded reading, value always within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Volume(u8),
    Brightness(u8),
}

impl ControlEvent {
    pub fn kind(&self) -> ControlKind {
        match self {
            Self::Volume(_) => ControlKind::Volume,
            Self::Brightness(_) => ControlKind::Brightness,
        }
    }

    pub fn value(&self) -> u8 {
        match *self {
            Self::Volume(v) | Self::Brightness(v) => v,
        }
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind().prefix(), self.value())
    }
}

/// Clamp a raw reading into the 0..=100 percent range
pub fn clamp_percent(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Decode one line (already stripped of its newline).
///
/// Returns `None` for anything that is not `V:<int>` or `B:<int>`.
pub fn decode(line: &str) -> Option<ControlEvent> {
    let (kind, payload) = if let Some(rest) = line.strip_prefix(prefix::VOLUME) {
        (ControlKind::Volume, rest)
    } else if let Some(rest) = line.strip_prefix(prefix::BRIGHTNESS) {
        (ControlKind::Brightness, rest)
    } else {
        return None;
    };

    let raw: i64 = payload.trim().parse().ok()?;
    let value = clamp_percent(raw);

    Some(match kind {
        ControlKind::Volume => ControlEvent::Volume(value),
        ControlKind::Brightness => ControlEvent::Brightness(value),
    })
}

/// Check whether a line proves the port is our device.
///
/// A protocol-shaped prefix is enough; the payload does not have to parse.
pub fn is_handshake_line(line: &str) -> bool {
    line.starts_with(prefix::VOLUME)
        || line.starts_with(prefix::BRIGHTNESS)
        || line == link::READY_MARKER
}
