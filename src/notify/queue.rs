//! Hand-off queue between the serial driver and the overlay scheduler.

use std::collections::VecDeque;

use osd_transport::{ControlEvent, ControlKind};
use parking_lot::Mutex;

/// One change to show on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: ControlKind,
    pub value: u8,
}

impl NotificationEvent {
    pub fn new(kind: ControlKind, value: u8) -> Self {
        Self { kind, value }
    }
}

impl From<ControlEvent> for NotificationEvent {
    fn from(event: ControlEvent) -> Self {
        Self::new(event.kind(), event.value())
    }
}

/// Unbounded FIFO, one producer (driver thread) and one consumer (overlay tick).
///
/// No capacity limit: the producer is paced by the device's line rate and
/// the consumer empties the queue on every tick.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<VecDeque<NotificationEvent>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: NotificationEvent) {
        self.pending.lock().push_back(event);
    }

    /// Take everything queued so far, oldest first
    pub fn drain_all(&self) -> Vec<NotificationEvent> {
        let drained = std::mem::take(&mut *self.pending.lock());
        drained.into()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
