// Control knob bridge - shared library
// Actuation, overlay state machine and the serial driver loop

pub mod actuation;
pub mod backend;
pub mod config;
pub mod driver;
pub mod error;
pub mod notify;

pub use actuation::{
    ActuationCoordinator, BrightnessBackend, BrightnessState, SmoothingStep, VolumeBackend,
};
pub use backend::{NullBackend, PactlVolume, SysfsBacklight};
pub use config::{BridgeConfig, OverlayConfig};
pub use driver::DriverLoop;
pub use error::ActuationError;
pub use notify::{NotificationEvent, NotificationQueue, OverlayController, OverlayPhase};
