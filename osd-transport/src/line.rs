//! Byte stream to line framing
//!
//! Serial reads hand back arbitrary chunks; a line can straddle two reads and
//! a freshly opened port often starts mid-line. `LineBuffer` keeps the
//! partial tail between pushes and yields only complete, trimmed lines.

use std::collections::VecDeque;

/// Longest run without a newline we keep before assuming garbage
pub const MAX_LINE_LEN: usize = 1024;

/// Accumulates bytes and splits them on `\n`
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: Vec<u8>,
    ready: VecDeque<String>,
    /// Inside an over-long line; skip everything up to the next newline
    discarding: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from the port
    pub fn push(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if b == b'\n' {
                if !self.discarding {
                    let line = String::from_utf8_lossy(&self.partial);
                    self.ready.push_back(line.trim().to_string());
                }
                self.partial.clear();
                self.discarding = false;
            } else if self.discarding {
                // Over-long line, dropped up to its newline
            } else if self.partial.len() < MAX_LINE_LEN {
                self.partial.push(b);
            } else {
                self.partial.clear();
                self.discarding = true;
            }
        }
    }

    /// Next complete line, if any
    pub fn pop_line(&mut self) -> Option<String> {
        self.ready.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_simple() {
        let mut buf = LineBuffer::new();
        buf.push(b"V:10\nB:20\n");
        assert_eq!(buf.pop_line().as_deref(), Some("V:10"));
        assert_eq!(buf.pop_line().as_deref(), Some("B:20"));
        assert_eq!(buf.pop_line(), None);
    }

    #[test]
    fn test_lines_split_across_pushes() {
        let mut buf = LineBuffer::new();
        buf.push(b"V:");
        assert_eq!(buf.pop_line(), None);
        buf.push(b"55\r");
        assert_eq!(buf.pop_line(), None);
        buf.push(b"\nB:");
        assert_eq!(buf.pop_line().as_deref(), Some("V:55"));
        assert_eq!(buf.pop_line(), None);
    }

    #[test]
    fn test_crlf_and_empty_lines() {
        let mut buf = LineBuffer::new();
        buf.push(b"ARDUINO_INICIADO\r\n\r\n");
        assert_eq!(buf.pop_line().as_deref(), Some("ARDUINO_INICIADO"));
        assert_eq!(buf.pop_line().as_deref(), Some(""));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut buf = LineBuffer::new();
        buf.push(&[0xFF, b'V', b'\n']);
        let line = buf.pop_line().unwrap();
        assert!(line.ends_with('V'));
        assert_ne!(line, "V");
    }

    #[test]
    fn test_runaway_line_is_discarded_whole() {
        let mut buf = LineBuffer::new();
        buf.push(&vec![b'x'; MAX_LINE_LEN + 10]);
        buf.push(b"tail of the noise\nV:1\n");
        assert_eq!(buf.pop_line().as_deref(), Some("V:1"));
        assert_eq!(buf.pop_line(), None);
    }

    #[test]
    fn test_line_at_the_limit_is_kept() {
        let mut buf = LineBuffer::new();
        buf.push(&vec![b'x'; MAX_LINE_LEN]);
        buf.push(b"\n");
        assert_eq!(buf.pop_line().map(|l| l.len()), Some(MAX_LINE_LEN));
    }
}
