//! On-screen notification overlay.
//!
//! Architecture:
//! - The serial driver pushes one [`NotificationEvent`] per decoded reading
//!   into the shared [`NotificationQueue`]
//! - A fixed-period scheduler (`daemon`) drains the queue every frame and
//!   feeds the events, in order, to the [`OverlayController`]
//! - The controller runs the fade-in / hold / fade-out state machine and
//!   calls an [`OverlayRenderer`] with the resolved icon, bar fill, opacity
//!   and label
//!
//! Nothing outside the scheduler touches overlay state.

pub mod daemon;
pub mod icons;
pub mod overlay;
pub mod queue;
pub mod render;

pub use icons::{icon_for, AssetHandle, IconAssetProvider, IconId, IconSet};
pub use overlay::{
    OverlayController, OverlayFrame, OverlayGeometry, OverlayPalette, OverlayPhase,
    OverlayRenderer, Rgb,
};
pub use queue::{NotificationEvent, NotificationQueue};
pub use render::TerminalRenderer;
