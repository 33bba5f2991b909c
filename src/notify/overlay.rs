//! On-screen overlay state machine.
//!
//! ```text
//!            event                opacity >= 1             hold elapsed
//!  Absent ─────────▶ FadingIn ─────────────────▶ Holding ──────────────▶ FadingOut
//!    ▲                  ▲                                                    │
//!    │                  └──────────────── event ─────────────────────────────┤
//!    └──────────────────────────── opacity <= 0 ─────────────────────────────┘
//! ```
//!
//! Every event refreshes the content and re-arms the hold timer. Opacity is
//! never reset by an event: a popup that is halfway faded out ramps back up
//! from where it is.
//!
//! Time comes in through [`OverlayController::tick`], so the controller has
//! no clock of its own.

use std::time::{Duration, Instant};

use osd_transport::ControlKind;
use tracing::debug;

use super::icons::{AssetHandle, IconAssetProvider};
use super::queue::NotificationEvent;
use crate::config::OverlayConfig;

/// Lifecycle phase of the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Absent,
    FadingIn,
    Holding,
    FadingOut,
}

/// RGB color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linearly interpolate between two colors.
    pub fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
        Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
    }
}

/// Popup colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPalette {
    pub background: Rgb,
    pub border: Rgb,
    pub bar_background: Rgb,
    pub bar_fill: Rgb,
    pub text: Rgb,
}

impl Default for OverlayPalette {
    fn default() -> Self {
        Self {
            background: Rgb::new(0xF6, 0xE8, 0xFF),
            border: Rgb::new(0xC5, 0x9B, 0xFF),
            bar_background: Rgb::new(0xEC, 0xD9, 0xFF),
            bar_fill: Rgb::new(0xC0, 0x8C, 0xFF),
            text: Rgb::new(0x66, 0x3B, 0x99),
        }
    }
}

/// Popup layout in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayGeometry {
    pub width: u32,
    pub height: u32,
    /// Distance of the popup's top edge below the screen's vertical center
    pub offset_below_center: u32,
    pub bar_x: u32,
    pub bar_y: u32,
    pub bar_width: u32,
    pub bar_height: u32,
}

impl Default for OverlayGeometry {
    fn default() -> Self {
        Self {
            width: 385,
            height: 100,
            offset_below_center: 210,
            bar_x: 95,
            bar_y: 38,
            bar_width: 190,
            bar_height: 20,
        }
    }
}

impl OverlayGeometry {
    /// Filled part of the bar for a percentage
    pub fn fill_width(&self, percent: u8) -> u32 {
        u32::from(percent.min(100)) * self.bar_width / 100
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub kind: ControlKind,
    pub icon: AssetHandle,
    /// 0..=100, mapped linearly onto the bar width
    pub fill_percent: u8,
    /// Filled bar length in pixels for window renderers
    pub fill_width: u32,
    /// 0.0..=1.0
    pub opacity: f32,
    pub label: String,
}

/// Draws the popup. Called only from the overlay scheduler.
pub trait OverlayRenderer: Send {
    /// Draw (or redraw) the popup with this content and opacity
    fn render(&mut self, frame: &OverlayFrame);

    /// Remove the popup from the screen
    fn dismiss(&mut self);
}

/// Drives the popup through its fade/hold lifecycle
pub struct OverlayController<R, I> {
    renderer: R,
    icons: I,
    geometry: OverlayGeometry,
    fade_step: f32,
    hold: Duration,
    phase: OverlayPhase,
    opacity: f32,
    current: Option<NotificationEvent>,
    hold_deadline: Option<Instant>,
}

impl<R: OverlayRenderer, I: IconAssetProvider> OverlayController<R, I> {
    pub fn new(renderer: R, icons: I, config: &OverlayConfig) -> Self {
        Self {
            renderer,
            icons,
            geometry: config.geometry,
            fade_step: config.fade_step,
            hold: config.hold,
            phase: OverlayPhase::Absent,
            opacity: 0.0,
            current: None,
            hold_deadline: None,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Last event shown (kept after the popup disappears)
    pub fn current(&self) -> Option<NotificationEvent> {
        self.current
    }

    pub fn is_visible(&self) -> bool {
        self.phase != OverlayPhase::Absent
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// One scheduler frame: apply drained events in order, then animate.
    pub fn tick<E>(&mut self, now: Instant, events: E)
    where
        E: IntoIterator<Item = NotificationEvent>,
    {
        for event in events {
            self.on_event(now, event);
        }
        self.advance(now);
    }

    /// Tear the popup down immediately
    pub fn dismiss(&mut self) {
        if self.phase != OverlayPhase::Absent {
            self.renderer.dismiss();
        }
        self.phase = OverlayPhase::Absent;
        self.opacity = 0.0;
        self.hold_deadline = None;
    }

    fn on_event(&mut self, now: Instant, event: NotificationEvent) {
        self.current = Some(event);
        self.hold_deadline = Some(now + self.hold);

        match self.phase {
            OverlayPhase::Absent => {
                debug!("Overlay shown for {} {}%", event.kind, event.value);
                self.opacity = 0.0;
                self.phase = OverlayPhase::FadingIn;
            }
            OverlayPhase::FadingOut => {
                self.phase = OverlayPhase::FadingIn;
            }
            OverlayPhase::FadingIn | OverlayPhase::Holding => {}
        }

        self.render();
    }

    fn advance(&mut self, now: Instant) {
        if self.phase == OverlayPhase::Holding
            && self.hold_deadline.map_or(true, |deadline| now >= deadline)
        {
            self.phase = OverlayPhase::FadingOut;
        }

        match self.phase {
            OverlayPhase::Absent => return,
            OverlayPhase::FadingIn => {
                self.opacity = (self.opacity + self.fade_step).min(1.0);
                if self.opacity >= 1.0 {
                    self.phase = OverlayPhase::Holding;
                }
            }
            OverlayPhase::Holding => {}
            OverlayPhase::FadingOut => {
                self.opacity -= self.fade_step;
                if self.opacity <= 0.0 {
                    self.opacity = 0.0;
                    self.phase = OverlayPhase::Absent;
                    self.hold_deadline = None;
                    self.renderer.dismiss();
                    debug!("Overlay hidden");
                    return;
                }
            }
        }

        self.render();
    }

    fn render(&mut self) {
        let Some(event) = self.current else {
            return;
        };
        let value = event.value.min(100);
        let frame = OverlayFrame {
            kind: event.kind,
            icon: self.icons.resolve(event.kind, value),
            fill_percent: value,
            fill_width: self.geometry.fill_width(value),
            opacity: self.opacity,
            label: format!("{}%", value),
        };
        self.renderer.render(&frame);
    }
}
