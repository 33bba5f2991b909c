//! Icon selection for the overlay.

use std::path::PathBuf;

use osd_transport::ControlKind;

/// Which picture the overlay shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconId {
    /// Muted speaker (volume 0)
    Volume0,
    /// Volume 1..=30
    Volume1,
    /// Volume 31..=70
    Volume2,
    /// Volume 71..=100
    Volume3,
    Brightness,
}

impl IconId {
    /// File name inside the icon directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Volume0 => "vol_0.png",
            Self::Volume1 => "vol_1.png",
            Self::Volume2 => "vol_2.png",
            Self::Volume3 => "vol_3.png",
            Self::Brightness => "brillo.png",
        }
    }

    /// Single-cell stand-in used by text renderers
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Volume0 => "🔇",
            Self::Volume1 => "🔈",
            Self::Volume2 => "🔉",
            Self::Volume3 => "🔊",
            Self::Brightness => "☀",
        }
    }
}

/// Pick the icon for a reading. Volume thresholds are inclusive upper bounds.
pub fn icon_for(kind: ControlKind, value: u8) -> IconId {
    match kind {
        ControlKind::Brightness => IconId::Brightness,
        ControlKind::Volume => match value {
            0 => IconId::Volume0,
            1..=30 => IconId::Volume1,
            31..=70 => IconId::Volume2,
            _ => IconId::Volume3,
        },
    }
}

/// A resolved icon, ready for a renderer to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    pub id: IconId,
    pub path: PathBuf,
}

/// Maps a reading to an icon asset. Pure lookup, no I/O.
pub trait IconAssetProvider: Send {
    fn resolve(&self, kind: ControlKind, value: u8) -> AssetHandle;
}

/// Icons stored as files in one directory
#[derive(Debug, Clone)]
pub struct IconSet {
    dir: PathBuf,
}

impl IconSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl IconAssetProvider for IconSet {
    fn resolve(&self, kind: ControlKind, value: u8) -> AssetHandle {
        let id = icon_for(kind, value);
        AssetHandle {
            id,
            path: self.dir.join(id.file_name()),
        }
    }
}
