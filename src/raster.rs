//! Stateless 2D rasterization over a single-pixel write.
//!
//! Everything here is integer-only and keeps no state between calls; each
//! routine turns a shape into a sequence of [`PixelSink::put_pixel`] calls.
//! Surfaces implement the sink (and drop pixels outside their bounds), so
//! these routines never clip.
//!
//! The circle routines are the classic midpoint formulation: `f` is the
//! decision variable, `dd_fx`/`dd_fy` its second-order increments.

use crate::color::Color;

/// Receives the pixels produced by the rasterizer.
pub trait PixelSink {
    fn put_pixel(&mut self, x: i32, y: i32, color: Color);
}

impl<F: FnMut(i32, i32, Color)> PixelSink for F {
    #[inline]
    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        self(x, y, color)
    }
}

/// Bresenham line from (x0,y0) to (x1,y1), both endpoints included.
///
/// Steep lines are stepped along y with the axes transposed. Endpoints are
/// ordered along the stepping axis first, so swapping them yields the same
/// pixels.
pub fn line<S: PixelSink + ?Sized>(
    sink: &mut S,
    mut x0: i32,
    mut y0: i32,
    mut x1: i32,
    mut y1: i32,
    color: Color,
) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        core::mem::swap(&mut x0, &mut y0);
        core::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        core::mem::swap(&mut x0, &mut x1);
        core::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let mut err = dx / 2;
    let ystep = if y0 < y1 { 1 } else { -1 };

    let mut y = y0;
    for x in x0..=x1 {
        if steep {
            sink.put_pixel(y, x, color);
        } else {
            sink.put_pixel(x, y, color);
        }
        err -= dy;
        if err < 0 {
            y += ystep;
            err += dx;
        }
    }
}

/// Horizontal span of `w` pixels starting at (x,y).
#[inline]
pub fn hline<S: PixelSink + ?Sized>(sink: &mut S, x: i32, y: i32, w: i32, color: Color) {
    if w > 0 {
        line(sink, x, y, x + w - 1, y, color);
    }
}

/// Vertical span of `h` pixels starting at (x,y).
#[inline]
pub fn vline<S: PixelSink + ?Sized>(sink: &mut S, x: i32, y: i32, h: i32, color: Color) {
    if h > 0 {
        line(sink, x, y, x, y + h - 1, color);
    }
}

/// Outline of a `w`×`h` rectangle with its top-left corner at (x,y).
pub fn rect<S: PixelSink + ?Sized>(sink: &mut S, x: i32, y: i32, w: i32, h: i32, color: Color) {
    hline(sink, x, y, w, color);
    hline(sink, x, y + h - 1, w, color);
    vline(sink, x, y, h, color);
    vline(sink, x + w - 1, y, h, color);
}

/// Solid `w`×`h` rectangle, swept column by column.
pub fn fill_rect<S: PixelSink + ?Sized>(
    sink: &mut S,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: Color,
) {
    for i in x..x + w {
        vline(sink, i, y, h, color);
    }
}

/// Midpoint circle outline of radius `r` around (x0,y0).
pub fn circle<S: PixelSink + ?Sized>(sink: &mut S, x0: i32, y0: i32, r: i32, color: Color) {
    let mut f = 1 - r;
    let mut dd_fx = 1;
    let mut dd_fy = -2 * r;
    let mut x = 0;
    let mut y = r;

    sink.put_pixel(x0, y0 + r, color);
    sink.put_pixel(x0, y0 - r, color);
    sink.put_pixel(x0 + r, y0, color);
    sink.put_pixel(x0 - r, y0, color);

    while x < y {
        if f >= 0 {
            y -= 1;
            dd_fy += 2;
            f += dd_fy;
        }
        x += 1;
        dd_fx += 2;
        f += dd_fx;

        sink.put_pixel(x0 + x, y0 + y, color);
        sink.put_pixel(x0 - x, y0 + y, color);
        sink.put_pixel(x0 + x, y0 - y, color);
        sink.put_pixel(x0 - x, y0 - y, color);
        sink.put_pixel(x0 + y, y0 + x, color);
        sink.put_pixel(x0 - y, y0 + x, color);
        sink.put_pixel(x0 + y, y0 - x, color);
        sink.put_pixel(x0 - y, y0 - x, color);
    }
}

/// Solid circle: the center column plus both halves from the helper.
pub fn fill_circle<S: PixelSink + ?Sized>(sink: &mut S, x0: i32, y0: i32, r: i32, color: Color) {
    vline(sink, x0, y0 - r, 2 * r + 1, color);
    fill_circle_helper(sink, x0, y0, r, CORNER_RIGHT | CORNER_LEFT, 0, color);
}

pub const CORNER_RIGHT: u8 = 1;
pub const CORNER_LEFT: u8 = 2;

/// Vertical spans for the right (`CORNER_RIGHT`) and/or left (`CORNER_LEFT`)
/// half of a filled circle, each stretched by `delta` extra pixels.
///
/// No span is emitted twice: the inner column stops once x passes y, and the
/// outer column is only drawn when y has moved since the previous one. Layers
/// with XOR/invert write modes depend on that.
pub fn fill_circle_helper<S: PixelSink + ?Sized>(
    sink: &mut S,
    x0: i32,
    y0: i32,
    r: i32,
    corners: u8,
    delta: i32,
    color: Color,
) {
    let mut f = 1 - r;
    let mut dd_fx = 1;
    let mut dd_fy = -2 * r;
    let mut x = 0;
    let mut y = r;
    let mut px = x;
    let mut py = y;

    let delta = delta + 1;

    while x < y {
        if f >= 0 {
            y -= 1;
            dd_fy += 2;
            f += dd_fy;
        }
        x += 1;
        dd_fx += 2;
        f += dd_fx;

        if x < y + 1 {
            if corners & CORNER_RIGHT != 0 {
                vline(sink, x0 + x, y0 - y, 2 * y + delta, color);
            }
            if corners & CORNER_LEFT != 0 {
                vline(sink, x0 - x, y0 - y, 2 * y + delta, color);
            }
        }
        if y != py {
            if corners & CORNER_RIGHT != 0 {
                vline(sink, x0 + py, y0 - px, 2 * px + delta, color);
            }
            if corners & CORNER_LEFT != 0 {
                vline(sink, x0 - py, y0 - px, 2 * px + delta, color);
            }
            py = y;
        }
        px = x;
    }
}
