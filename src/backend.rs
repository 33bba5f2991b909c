//! Default OS backends for volume and brightness
//!
//! - Volume: `pactl set-sink-volume @DEFAULT_SINK@ N%` (PulseAudio/PipeWire)
//! - Brightness: `/sys/class/backlight/<dev>/brightness`, scaled to
//!   `max_brightness`
//!
//! Both are best-effort. Errors go back to the coordinator, which decides
//! whether to drop or retry them.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::actuation::{BrightnessBackend, VolumeBackend};
use crate::error::ActuationError;

/// Backlight class directory
const BACKLIGHT_CLASS_DIR: &str = "/sys/class/backlight";
const BRIGHTNESS_FILE: &str = "brightness";
const MAX_BRIGHTNESS_FILE: &str = "max_brightness";

const PACTL: &str = "pactl";

/// Volume through the PulseAudio command line client
#[derive(Debug, Clone)]
pub struct PactlVolume {
    sink: String,
}

impl Default for PactlVolume {
    fn default() -> Self {
        Self::new("@DEFAULT_SINK@")
    }
}

impl PactlVolume {
    pub fn new(sink: impl Into<String>) -> Self {
        Self { sink: sink.into() }
    }

    /// Arguments passed to `pactl` for a given percentage
    pub fn args(&self, percent: u8) -> [String; 3] {
        [
            "set-sink-volume".to_string(),
            self.sink.clone(),
            format!("{}%", percent.min(100)),
        ]
    }
}

impl VolumeBackend for PactlVolume {
    fn set(&self, percent: u8) -> Result<(), ActuationError> {
        let status = Command::new(PACTL)
            .args(self.args(percent))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ActuationError::Spawn {
                program: PACTL,
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ActuationError::Command {
                program: PACTL,
                status,
            })
        }
    }
}

/// Backlight through the kernel's sysfs interface
#[derive(Debug, Clone)]
pub struct SysfsBacklight {
    device_dir: PathBuf,
    max_brightness: u32,
}

impl SysfsBacklight {
    /// Use the first device under `/sys/class/backlight`
    pub fn discover() -> Result<Self, ActuationError> {
        Self::discover_in(Path::new(BACKLIGHT_CLASS_DIR))
    }

    /// Use the first device (by name) under `class_dir`
    pub fn discover_in(class_dir: &Path) -> Result<Self, ActuationError> {
        let entries = fs::read_dir(class_dir).map_err(|source| ActuationError::Sysfs {
            path: class_dir.to_path_buf(),
            source,
        })?;

        let mut devices: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        devices.sort();

        let device_dir = devices.into_iter().next().ok_or(ActuationError::NoBacklight)?;
        Self::at(device_dir)
    }

    /// Bind to a specific backlight device directory
    pub fn at(device_dir: impl Into<PathBuf>) -> Result<Self, ActuationError> {
        let device_dir = device_dir.into();
        let max_path = device_dir.join(MAX_BRIGHTNESS_FILE);
        let contents = fs::read_to_string(&max_path).map_err(|source| ActuationError::Sysfs {
            path: max_path.clone(),
            source,
        })?;
        let max_brightness = contents
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&max| max > 0)
            .ok_or_else(|| ActuationError::SysfsParse {
                path: max_path,
                contents: contents.trim().to_string(),
            })?;

        debug!(
            "Backlight {} (max {})",
            device_dir.display(),
            max_brightness
        );
        Ok(Self {
            device_dir,
            max_brightness,
        })
    }

    pub fn device_dir(&self) -> &Path {
        &self.device_dir
    }

    /// Convert a percentage to a raw sysfs level (rounded)
    pub fn raw_level(&self, percent: u8) -> u32 {
        let percent = u64::from(percent.min(100));
        let max = u64::from(self.max_brightness);
        ((percent * max + 50) / 100) as u32
    }
}

impl BrightnessBackend for SysfsBacklight {
    fn set(&self, percent: u8) -> Result<(), ActuationError> {
        let path = self.device_dir.join(BRIGHTNESS_FILE);
        let level = self.raw_level(percent);
        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new().write(true).truncate(true).open(&path)?;
            writeln!(file, "{}", level)
        };
        write().map_err(|source| ActuationError::Sysfs { path, source })
    }
}

/// Accepts every value and does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl VolumeBackend for NullBackend {
    fn set(&self, percent: u8) -> Result<(), ActuationError> {
        debug!("(null) volume {}%", percent);
        Ok(())
    }
}

impl BrightnessBackend for NullBackend {
    fn set(&self, percent: u8) -> Result<(), ActuationError> {
        debug!("(null) brightness {}%", percent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("osd-bridge-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fake_backlight(class_dir: &Path, name: &str, max: &str) -> PathBuf {
        let dev = class_dir.join(name);
        fs::create_dir_all(&dev).unwrap();
        fs::write(dev.join(MAX_BRIGHTNESS_FILE), format!("{max}\n")).unwrap();
        fs::write(dev.join(BRIGHTNESS_FILE), "0\n").unwrap();
        dev
    }

    #[test]
    fn test_pactl_args() {
        let vol = PactlVolume::default();
        assert_eq!(vol.args(42), ["set-sink-volume", "@DEFAULT_SINK@", "42%"]);
        assert_eq!(vol.args(200)[2], "100%");
    }

    #[test]
    fn test_sysfs_scaling_and_write() {
        let class = scratch_dir("scale");
        let dev = fake_backlight(&class, "intel_backlight", "19200");

        let backlight = SysfsBacklight::discover_in(&class).unwrap();
        assert_eq!(backlight.device_dir(), dev.as_path());
        assert_eq!(backlight.raw_level(0), 0);
        assert_eq!(backlight.raw_level(100), 19200);
        assert_eq!(backlight.raw_level(50), 9600);

        backlight.set(25).unwrap();
        let written = fs::read_to_string(dev.join(BRIGHTNESS_FILE)).unwrap();
        assert_eq!(written.trim(), "4800");

        fs::remove_dir_all(&class).ok();
    }

    #[test]
    fn test_sysfs_rounding_small_max() {
        let class = scratch_dir("round");
        fake_backlight(&class, "acpi_video0", "7");
        let backlight = SysfsBacklight::discover_in(&class).unwrap();
        // 7 * 50 / 100 = 3.5 -> 4
        assert_eq!(backlight.raw_level(50), 4);
        assert_eq!(backlight.raw_level(1), 0);
        fs::remove_dir_all(&class).ok();
    }

    #[test]
    fn test_sysfs_errors() {
        let class = scratch_dir("errors");
        assert!(matches!(
            SysfsBacklight::discover_in(&class),
            Err(ActuationError::NoBacklight)
        ));

        fake_backlight(&class, "broken", "zero");
        assert!(matches!(
            SysfsBacklight::discover_in(&class),
            Err(ActuationError::SysfsParse { .. })
        ));

        assert!(matches!(
            SysfsBacklight::discover_in(&class.join("missing")),
            Err(ActuationError::Sysfs { .. })
        ));
        fs::remove_dir_all(&class).ok();
    }
}
