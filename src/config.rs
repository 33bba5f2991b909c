//! Runtime configuration
//!
//! There is no config file: every knob lives here with its default, and
//! tests build configs with zeroed delays instead.

use std::path::PathBuf;
use std::time::Duration;

use osd_transport::LocatorConfig;

use crate::notify::overlay::{OverlayGeometry, OverlayPalette};

/// Scheduling constants
pub mod timing {
    use std::time::Duration;

    /// Brightness smoothing worker period
    pub const SMOOTHING_PERIOD: Duration = Duration::from_millis(5);
    /// Overlay scheduler period (drain queue + advance animation)
    pub const OVERLAY_TICK: Duration = Duration::from_millis(30);
    /// Sleep when the serial port has nothing to read
    pub const DRIVER_IDLE: Duration = Duration::from_millis(1);
    /// Pause between accepting a port and reading from it
    pub const CONNECT_SETTLE: Duration = Duration::from_secs(2);
    /// How long the overlay stays fully visible after the last event
    pub const OVERLAY_HOLD: Duration = Duration::from_millis(1300);
    /// Opacity change per overlay tick while fading
    pub const FADE_STEP: f32 = 0.12;
}

/// Overlay animation and layout
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub fade_step: f32,
    pub hold: Duration,
    pub geometry: OverlayGeometry,
    pub palette: OverlayPalette,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fade_step: timing::FADE_STEP,
            hold: timing::OVERLAY_HOLD,
            geometry: OverlayGeometry::default(),
            palette: OverlayPalette::default(),
        }
    }
}

/// Top-level configuration for the bridge
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub locator: LocatorConfig,
    pub smoothing_period: Duration,
    pub overlay_tick: Duration,
    pub driver_idle: Duration,
    pub connect_settle: Duration,
    pub overlay: OverlayConfig,
    /// Directory holding `vol_0.png` .. `vol_3.png` and `brillo.png`
    pub icon_dir: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            locator: LocatorConfig::default(),
            smoothing_period: timing::SMOOTHING_PERIOD,
            overlay_tick: timing::OVERLAY_TICK,
            driver_idle: timing::DRIVER_IDLE,
            connect_settle: timing::CONNECT_SETTLE,
            overlay: OverlayConfig::default(),
            icon_dir: default_icon_dir(),
        }
    }
}

/// `icons/` next to the executable, falling back to the working directory
pub fn default_icon_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("icons")))
        .unwrap_or_else(|| PathBuf::from("icons"))
}
