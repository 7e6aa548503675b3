//! Character overlay composited above the frame buffer.
//!
//! 80x30 cells, each a 7-bit glyph code stored at `(y << 7) | x`; bit 7 of
//! the stored code asks the core for reverse video. Cell memory shares the
//! window with three control registers.

use crate::bus::RegisterBus;
use crate::color::Color;

pub const OSD_COLS: i32 = 80;
pub const OSD_ROWS: i32 = 30;

/// Glyph that renders as nothing.
pub const NULL_GLYPH: u8 = 0x00;

const BYPASS_REG: u32 = 0x2000;
const FG_COLOR_REG: u32 = 0x2001;
const BG_COLOR_REG: u32 = 0x2002;

const REVERSE_BIT: u32 = 0x80;

pub struct OverlaySurface<B> {
    bus: B,
    base: u32,
}

impl<B: RegisterBus> OverlaySurface<B> {
    /// Attach to the core at `base`; text starts out green on the chroma key.
    pub fn new(bus: B, base: u32) -> Self {
        let mut osd = Self { bus, base };
        osd.set_colors(Color::GREEN, Color::TRANSPARENT);
        osd
    }

    pub fn set_colors(&mut self, fg: Color, bg: Color) {
        self.bus.write(self.base, FG_COLOR_REG, fg.raw() as u32);
        self.bus.write(self.base, BG_COLOR_REG, bg.raw() as u32);
    }

    pub fn bypass(&mut self, on: bool) {
        self.bus.write(self.base, BYPASS_REG, on as u32);
    }

    pub fn write_char(&mut self, x: i32, y: i32, code: u8, reverse: bool) {
        if !(0..OSD_COLS).contains(&x) || !(0..OSD_ROWS).contains(&y) {
            return;
        }
        let offset = ((y as u32) << 7) | (x as u32 & 0x7f);
        let mut value = code as u32;
        if reverse {
            value |= REVERSE_BIT;
        }
        self.bus.write(self.base, offset, value);
    }

    /// Write a run of glyph codes starting at (x,y); stops at the right edge.
    pub fn write_text(&mut self, x: i32, y: i32, text: &[u8]) {
        for (i, &code) in text.iter().enumerate() {
            let cx = x + i as i32;
            if cx >= OSD_COLS {
                break;
            }
            self.write_char(cx, y, code, false);
        }
    }

    /// Blank every cell.
    pub fn clear(&mut self) {
        for x in 0..OSD_COLS {
            for y in 0..OSD_ROWS {
                self.write_char(x, y, NULL_GLYPH, false);
            }
        }
    }
}
