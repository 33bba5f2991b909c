//! Control knob bridge
//!
//! Finds the knob on a serial port, forwards its readings to the system
//! volume and backlight, and shows every change as a fading overlay.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use osd_bridge::notify::{daemon, IconSet, TerminalRenderer};
use osd_bridge::{
    ActuationCoordinator, BridgeConfig, BrightnessBackend, DriverLoop, NotificationQueue,
    NullBackend, OverlayController, PactlVolume, SysfsBacklight, VolumeBackend,
};
use osd_transport::{DeviceLocator, NativeBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = BridgeConfig::default();

    let volume: Arc<dyn VolumeBackend> = Arc::new(PactlVolume::default());
    let brightness: Arc<dyn BrightnessBackend> = match SysfsBacklight::discover() {
        Ok(backlight) => {
            info!("Brightness via {}", backlight.device_dir().display());
            Arc::new(backlight)
        }
        Err(e) => {
            warn!("Brightness control disabled: {}", e);
            Arc::new(NullBackend)
        }
    };

    let actuation = Arc::new(ActuationCoordinator::new(volume, brightness));
    let queue = Arc::new(NotificationQueue::new());

    tokio::spawn(Arc::clone(&actuation).run_smoothing(config.smoothing_period));

    let locator = DeviceLocator::with_config(NativeBackend::new(), config.locator.clone());
    DriverLoop::new(
        locator,
        Arc::clone(&actuation),
        Arc::clone(&queue),
        config.driver_idle,
    )
    .with_connect_settle(config.connect_settle)
    .spawn()
    .context("spawn serial driver thread")?;

    let mut overlay = OverlayController::new(
        TerminalRenderer::stdout(config.overlay.palette),
        IconSet::new(config.icon_dir.clone()),
        &config.overlay,
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    info!("Ready. Ctrl+C to stop.");
    tokio::select! {
        _ = daemon::run(&mut overlay, &queue, config.overlay_tick) => {}
        _ = shutdown => {}
    }

    overlay.dismiss();
    info!("Done.");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("osd_bridge=info,osd_transport=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
