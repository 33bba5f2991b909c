//! Volume and brightness actuation
//!
//! Volume is applied the moment a reading arrives. Brightness is only
//! recorded as a target; a periodic worker pushes the latest target to the
//! backlight, so a knob sweep that produces dozens of readings collapses into
//! a few OS calls.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::error::ActuationError;

/// Sets the system output volume
pub trait VolumeBackend: Send + Sync {
    fn set(&self, percent: u8) -> Result<(), ActuationError>;
}

/// Sets the display brightness
pub trait BrightnessBackend: Send + Sync {
    fn set(&self, percent: u8) -> Result<(), ActuationError>;
}

/// Brightness target written by the driver, applied value written by the worker
#[derive(Debug, Default)]
pub struct BrightnessState {
    target: AtomicU8,
    applied: AtomicU8,
}

impl BrightnessState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> u8 {
        self.target.load(Ordering::Acquire)
    }

    pub fn applied(&self) -> u8 {
        self.applied.load(Ordering::Acquire)
    }

    pub fn set_target(&self, value: u8) {
        self.target.store(value, Ordering::Release);
    }

    fn mark_applied(&self, value: u8) {
        self.applied.store(value, Ordering::Release);
    }

    /// True once the worker has caught up with the latest target
    pub fn is_settled(&self) -> bool {
        self.target() == self.applied()
    }
}

/// Outcome of one smoothing worker iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingStep {
    /// Applied value already matches the target
    Idle,
    /// Backend accepted the new value
    Applied(u8),
    /// Backend refused; state untouched, retried next tick
    Failed,
}

/// Owns the actuation backends and the shared brightness state
pub struct ActuationCoordinator {
    volume: Arc<dyn VolumeBackend>,
    brightness: Arc<dyn BrightnessBackend>,
    state: Arc<BrightnessState>,
}

impl ActuationCoordinator {
    pub fn new(volume: Arc<dyn VolumeBackend>, brightness: Arc<dyn BrightnessBackend>) -> Self {
        Self {
            volume,
            brightness,
            state: Arc::new(BrightnessState::new()),
        }
    }

    /// Shared brightness state (for diagnostics and tests)
    pub fn brightness_state(&self) -> &Arc<BrightnessState> {
        &self.state
    }

    /// Apply volume immediately. Failures are logged and dropped.
    pub fn apply_volume(&self, percent: u8) {
        if let Err(e) = self.volume.set(percent) {
            debug!("Volume backend failed for {}%: {}", percent, e);
        }
    }

    /// Record a new brightness target; the worker applies it
    pub fn set_brightness_target(&self, percent: u8) {
        self.state.set_target(percent);
    }

    /// One smoothing iteration: push `target` to the backend if it moved
    pub fn smoothing_tick(&self) -> SmoothingStep {
        let target = self.state.target();
        if target == self.state.applied() {
            return SmoothingStep::Idle;
        }

        match self.brightness.set(target) {
            Ok(()) => {
                self.state.mark_applied(target);
                trace!("Brightness applied: {}%", target);
                SmoothingStep::Applied(target)
            }
            Err(e) => {
                debug!("Brightness backend failed for {}%: {}", target, e);
                SmoothingStep::Failed
            }
        }
    }

    /// Run the smoothing worker forever at a fixed period
    pub async fn run_smoothing(self: Arc<Self>, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.smoothing_tick();
        }
    }
}
