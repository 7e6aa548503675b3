//! 640x480 pixel frame buffer layer.
//!
//! Every pixel is one register word at offset `width * y + x` inside the
//! frame window; the bypass register sits past the last pixel. Pixels outside
//! the canvas are dropped before they reach the bus.

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::{OriginDimensions, Size},
    Pixel,
};

use crate::bus::RegisterBus;
use crate::color::Color;
use crate::raster::{self, PixelSink};

pub const FRAME_WIDTH: i32 = 640;
pub const FRAME_HEIGHT: i32 = 480;

const BYPASS_REG: u32 = 0x7FFFF;

pub struct FrameSurface<B> {
    bus: B,
    base: u32,
}

impl<B: RegisterBus> FrameSurface<B> {
    pub fn new(bus: B, base: u32) -> Self {
        Self { bus, base }
    }

    #[inline]
    pub fn contains(x: i32, y: i32) -> bool {
        (0..FRAME_WIDTH).contains(&x) && (0..FRAME_HEIGHT).contains(&y)
    }

    /// Write one pixel; silently dropped outside the canvas.
    pub fn wr_pix(&mut self, x: i32, y: i32, color: Color) {
        if !Self::contains(x, y) {
            return;
        }
        let offset = (FRAME_WIDTH * y + x) as u32;
        self.bus.write(self.base, offset, color.raw() as u32);
    }

    /// Paint the whole canvas, one column at a time.
    pub fn clear(&mut self, color: Color) {
        for x in 0..FRAME_WIDTH {
            for y in 0..FRAME_HEIGHT {
                self.wr_pix(x, y, color);
            }
        }
    }

    pub fn bypass(&mut self, on: bool) {
        self.bus.write(self.base, BYPASS_REG, on as u32);
    }

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        raster::line(self, x0, y0, x1, y1, color);
    }

    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        raster::rect(self, x, y, w, h, color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        raster::fill_rect(self, x, y, w, h, color);
    }

    pub fn draw_circle(&mut self, x: i32, y: i32, r: i32, color: Color) {
        raster::circle(self, x, y, r, color);
    }

    pub fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Color) {
        raster::fill_circle(self, x, y, r, color);
    }
}

impl<B: RegisterBus> PixelSink for FrameSurface<B> {
    #[inline]
    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.wr_pix(x, y, color);
    }
}

impl<B> OriginDimensions for FrameSurface<B> {
    fn size(&self) -> Size {
        Size::new(FRAME_WIDTH as u32, FRAME_HEIGHT as u32)
    }
}

// Lets embedded-graphics text and primitives land on the canvas; colors lose
// their low nibble per channel.
impl<B: RegisterBus> embedded_graphics::draw_target::DrawTarget for FrameSurface<B> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb888>>,
    {
        for Pixel(p, c) in pixels {
            self.wr_pix(p.x, p.y, c.into());
        }
        Ok(())
    }
}
