//! Serial driver loop: device → decoder → actuation + overlay queue.
//!
//! Runs on its own OS thread because every serial call blocks. A session
//! lasts until the endpoint returns an I/O error; the endpoint is then
//! dropped and discovery starts over with the same backoff as at startup.
//! Each new connection waits out a settle period before it is read, so the
//! board finishes booting; its output meanwhile stays in the port buffer.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use osd_transport::{
    protocol, ControlEvent, DeviceLocator, SerialBackend, SerialEndpoint, TransportError,
};
use tracing::{debug, trace, warn};

use crate::actuation::ActuationCoordinator;
use crate::config::timing;
use crate::notify::NotificationQueue;

pub struct DriverLoop<B: SerialBackend> {
    locator: DeviceLocator<B>,
    actuation: Arc<ActuationCoordinator>,
    queue: Arc<NotificationQueue>,
    idle: Duration,
    settle: Duration,
}

impl<B: SerialBackend> DriverLoop<B> {
    pub fn new(
        locator: DeviceLocator<B>,
        actuation: Arc<ActuationCoordinator>,
        queue: Arc<NotificationQueue>,
        idle: Duration,
    ) -> Self {
        Self {
            locator,
            actuation,
            queue,
            idle,
            settle: timing::CONNECT_SETTLE,
        }
    }

    /// Override the pause between discovery and the first read
    pub fn with_connect_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Find the device and let it settle
    pub fn connect(&self) -> SerialEndpoint {
        let endpoint = self.locator.discover();
        if !self.settle.is_zero() {
            debug!(
                "Waiting {:?} before reading {}",
                self.settle,
                endpoint.port_name()
            );
            std::thread::sleep(self.settle);
        }
        endpoint
    }

    /// Discover, pump, reconnect. Never returns.
    pub fn run(&self) {
        loop {
            let mut endpoint = self.connect();
            let err = self.run_session(&mut endpoint);
            warn!("Lost device on {}: {}", endpoint.port_name(), err);
        }
    }

    /// Pump one connection until it fails; returns the error that ended it
    pub fn run_session(&self, endpoint: &mut SerialEndpoint) -> TransportError {
        loop {
            match endpoint.poll_line() {
                Ok(Some(line)) => {
                    self.handle_line(&line);
                }
                Ok(None) => std::thread::sleep(self.idle),
                Err(e) => return e,
            }
        }
    }

    /// Decode one line and route the reading.
    ///
    /// Noise is dropped quietly; it is expected on a freshly opened port.
    pub fn handle_line(&self, line: &str) -> Option<ControlEvent> {
        if line.is_empty() {
            return None;
        }
        debug!("Received: {}", line);

        let Some(event) = protocol::decode(line) else {
            trace!("Ignoring line {:?}", line);
            return None;
        };

        match event {
            ControlEvent::Volume(v) => self.actuation.apply_volume(v),
            ControlEvent::Brightness(v) => self.actuation.set_brightness_target(v),
        }
        self.queue.push(event.into());
        Some(event)
    }
}

impl<B: SerialBackend + 'static> DriverLoop<B> {
    /// Start the loop on a dedicated thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("serial-driver".into())
            .spawn(move || self.run())
    }
}
