//! Terminal renderer: draws the popup as one colored status line.
//!
//! Opacity is approximated by blending every palette color toward the
//! terminal background.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use tracing::trace;

use super::overlay::{OverlayFrame, OverlayPalette, OverlayRenderer, Rgb};

/// Bar width in terminal cells
pub const BAR_CELLS: usize = 20;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Renders into any writer (stdout in the binary, a buffer in tests)
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    palette: OverlayPalette,
    backdrop: Rgb,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout(palette: OverlayPalette) -> Self {
        Self::new(io::stdout(), palette)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, palette: OverlayPalette) -> Self {
        Self {
            out,
            palette,
            backdrop: Rgb::new(0, 0, 0),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn faded(&self, color: Rgb, opacity: f32) -> Color {
        let c = Rgb::lerp(self.backdrop, color, opacity);
        Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }

    fn draw(&mut self, frame: &OverlayFrame) -> io::Result<()> {
        let filled = usize::from(frame.fill_percent.min(100)) * BAR_CELLS / 100;
        let bar_on: String = std::iter::repeat(FILLED).take(filled).collect();
        let bar_off: String = std::iter::repeat(EMPTY).take(BAR_CELLS - filled).collect();

        let border = self.faded(self.palette.border, frame.opacity);
        let fill = self.faded(self.palette.bar_fill, frame.opacity);
        let empty = self.faded(self.palette.bar_background, frame.opacity);
        let text = self.faded(self.palette.text, frame.opacity);

        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(border),
            Print(format!("{} ", frame.icon.id.glyph())),
            SetForegroundColor(fill),
            Print(bar_on),
            SetForegroundColor(empty),
            Print(bar_off),
            SetForegroundColor(text),
            Print(format!(" {:>4}", frame.label)),
            ResetColor
        )?;
        self.out.flush()
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine), ResetColor)?;
        self.out.flush()
    }
}

impl<W: Write + Send> OverlayRenderer for TerminalRenderer<W> {
    fn render(&mut self, frame: &OverlayFrame) {
        if let Err(e) = self.draw(frame) {
            trace!("Overlay draw failed: {}", e);
        }
    }

    fn dismiss(&mut self) {
        if let Err(e) = self.clear() {
            trace!("Overlay clear failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::icons::{AssetHandle, IconId};
    use osd_transport::ControlKind;
    use std::path::PathBuf;

    fn frame(value: u8, opacity: f32) -> OverlayFrame {
        OverlayFrame {
            kind: ControlKind::Volume,
            icon: AssetHandle {
                id: IconId::Volume2,
                path: PathBuf::from("icons/vol_2.png"),
            },
            fill_percent: value,
            fill_width: u32::from(value) * 190 / 100,
            opacity,
            label: format!("{value}%"),
        }
    }

    fn output(renderer: &TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8_lossy(renderer.get_ref()).into_owned()
    }

    #[test]
    fn test_bar_proportional_to_value() {
        let mut r = TerminalRenderer::new(Vec::new(), OverlayPalette::default());
        r.render(&frame(50, 1.0));
        let out = output(&r);
        assert_eq!(out.matches(FILLED).count(), 10);
        assert_eq!(out.matches(EMPTY).count(), 10);
        assert!(out.contains("50%"));
        assert!(out.contains(IconId::Volume2.glyph()));
    }

    #[test]
    fn test_bar_extremes() {
        let mut r = TerminalRenderer::new(Vec::new(), OverlayPalette::default());
        r.render(&frame(0, 1.0));
        assert_eq!(output(&r).matches(FILLED).count(), 0);

        let mut r = TerminalRenderer::new(Vec::new(), OverlayPalette::default());
        r.render(&frame(100, 1.0));
        assert_eq!(output(&r).matches(FILLED).count(), BAR_CELLS);
    }

    #[test]
    fn test_opacity_dims_colors() {
        let palette = OverlayPalette::default();
        let r = TerminalRenderer::new(Vec::new(), palette);
        assert_eq!(r.faded(palette.text, 0.0), Color::Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(
            r.faded(palette.text, 1.0),
            Color::Rgb {
                r: 0x66,
                g: 0x3B,
                b: 0x99
            }
        );
    }

    #[test]
    fn test_dismiss_clears_line() {
        let mut r = TerminalRenderer::new(Vec::new(), OverlayPalette::default());
        r.dismiss();
        assert!(!r.get_ref().is_empty());
        assert!(!output(&r).contains('%'));
    }
}
