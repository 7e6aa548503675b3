//! Painting screen layout and rendering.
//!
//! This module provides:
//! - The static layout: canvas bounds, brush icons, palette swatches, clear button
//! - `HIT_REGIONS`, the ordered table of clickable areas and their `UiAction`
//! - `render_canvas` and the small redraw helpers the controller uses
//! - Overlay text: trademark, welcome banner, missing-mouse notice
//!
//! Coordinates are frame buffer pixels (640x480) unless they say "cell";
//! overlay cells are 8x16 pixels.

use embedded_hal::delay::DelayNs;

use crate::bus::RegisterBus;
use crate::color::Color;
use crate::frame::FrameSurface;
use crate::osd::{OverlaySurface, NULL_GLYPH};

// Drawable area, exclusive on every side.
pub const CANVAS_LEFT: i32 = 100;
pub const CANVAS_TOP: i32 = 70;
pub const CANVAS_RIGHT: i32 = 540;
pub const CANVAS_BOTTOM: i32 = 410;

// Current-color swatch, ringed in ink.
pub const SWATCH_X: i32 = 60;
pub const SWATCH_Y: i32 = 110;
pub const SWATCH_RADIUS: i32 = 29;

/// True if a brush of radius `r` centered at (x,y) stays inside the canvas.
pub fn in_canvas(x: i32, y: i32, r: i32) -> bool {
    x > CANVAS_LEFT + r && x < CANVAS_RIGHT - r && y > CANVAS_TOP + r && y < CANVAS_BOTTOM - r
}

/// Open rectangle: the edges themselves are outside.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x > self.left && x < self.right && y > self.top && y < self.bottom
    }
}

/// Outline drawn with `draw_rect` (top-left corner plus size).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outline {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

const fn outline(x: i32, y: i32, w: i32, h: i32) -> Outline {
    Outline { x, y, w, h }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    /// Pick a preset brush; `border` indexes `BRUSH_BORDERS`.
    Brush { radius: i32, border: usize },
    Color(Color),
    Clear,
}

#[derive(Copy, Clone, Debug)]
pub struct HitRegion {
    pub bounds: Bounds,
    pub action: UiAction,
}

// Preset brushes: (icon x, icon y, radius) and the selection frame around each.
pub const BRUSH_ICONS: [(i32, i32, i32); 4] =
    [(40, 170, 5), (75, 170, 8), (40, 210, 11), (75, 210, 16)];
pub const BRUSH_BORDERS: [Outline; 4] = [
    outline(28, 159, 25, 25),
    outline(63, 159, 25, 25),
    outline(28, 199, 25, 25),
    outline(58, 194, 35, 35),
];

pub const ORANGE: Color = Color::from_raw(0xf80);
pub const YELLOW: Color = Color::from_raw(0xff0);
pub const BLUE: Color = Color::from_raw(0x00f);
pub const PURPLE: Color = Color::from_raw(0x80f);
pub const PINK: Color = Color::from_raw(0xf8c);
pub const BROWN: Color = Color::from_raw(0x842);

/// Swatches, row-major in two columns.
pub const PALETTE: [Color; 10] = [
    Color::INK,
    Color::RED,
    ORANGE,
    YELLOW,
    Color::GREEN,
    BLUE,
    PURPLE,
    PINK,
    BROWN,
    Color::WHITE,
];

// Swatch grid: outline origin per column, 20 px between rows.
const SWATCH_COLS: [i32; 2] = [38, 68];
const SWATCH_TOP: i32 = 250;
const SWATCH_PITCH: i32 = 20;
const SWATCH_SIZE: i32 = 15;

// Hit areas are a pixel or two looser than the drawn swatch.
const SWATCH_HIT_COLS: [(i32, i32); 2] = [(37, 53), (67, 84)];

const CLEAR_BUTTON: Outline = outline(37, 382, 45, 20);

const fn brush_region(i: usize, bounds: Bounds) -> HitRegion {
    HitRegion { bounds, action: UiAction::Brush { radius: BRUSH_ICONS[i].2, border: i } }
}

const fn swatch_region(i: usize) -> HitRegion {
    let (left, right) = SWATCH_HIT_COLS[i % 2];
    let top = SWATCH_TOP - 1 + SWATCH_PITCH * (i / 2) as i32;
    HitRegion {
        bounds: Bounds::new(left, top, right, top + 17),
        action: UiAction::Color(PALETTE[i]),
    }
}

/// Checked in order; the first match wins.
pub const HIT_REGIONS: [HitRegion; 15] = [
    brush_region(0, Bounds::new(28, 158, 52, 182)),
    brush_region(1, Bounds::new(63, 158, 87, 182)),
    brush_region(2, Bounds::new(28, 198, 52, 222)),
    brush_region(3, Bounds::new(58, 193, 92, 227)),
    swatch_region(0),
    swatch_region(1),
    swatch_region(2),
    swatch_region(3),
    swatch_region(4),
    swatch_region(5),
    swatch_region(6),
    swatch_region(7),
    swatch_region(8),
    swatch_region(9),
    HitRegion { bounds: Bounds::new(36, 381, 82, 403), action: UiAction::Clear },
];

pub fn hit_test(x: i32, y: i32) -> Option<UiAction> {
    HIT_REGIONS
        .iter()
        .find(|r| r.bounds.contains(x, y))
        .map(|r| r.action)
}

/// Full repaint of the static screen: frame color, white canvas, tools.
/// The current-color swatch is left to the caller.
pub fn render_canvas<B: RegisterBus>(fb: &mut FrameSurface<B>) {
    fb.clear(Color::BACKGROUND);
    fb.bypass(false);

    let (w, h) = (CANVAS_RIGHT - CANVAS_LEFT, CANVAS_BOTTOM - CANVAS_TOP);
    fb.fill_rect(CANVAS_LEFT, CANVAS_TOP, w, h, Color::WHITE);
    fb.draw_rect(CANVAS_LEFT - 1, CANVAS_TOP - 1, w + 2, h + 2, Color::INK);

    fb.draw_circle(SWATCH_X, SWATCH_Y, SWATCH_RADIUS + 1, Color::INK);

    for (x, y, r) in BRUSH_ICONS {
        fb.fill_circle(x, y, r, Color::INK);
    }

    for (i, color) in PALETTE.iter().enumerate() {
        let x = SWATCH_COLS[i % 2];
        let y = SWATCH_TOP + SWATCH_PITCH * (i / 2) as i32;
        fb.draw_rect(x, y, SWATCH_SIZE, SWATCH_SIZE, Color::INK);
        fb.fill_rect(x + 1, y + 1, SWATCH_SIZE - 2, SWATCH_SIZE - 2, *color);
    }

    let b = CLEAR_BUTTON;
    fb.draw_rect(b.x, b.y, b.w, b.h, Color::INK);
}

pub fn draw_swatch<B: RegisterBus>(fb: &mut FrameSurface<B>, color: Color) {
    fb.fill_circle(SWATCH_X, SWATCH_Y, SWATCH_RADIUS, color);
}

/// Frame the chosen preset brush in ink and hide the rest. `None` hides all.
pub fn select_brush_border<B: RegisterBus>(fb: &mut FrameSurface<B>, selected: Option<usize>) {
    // the chosen frame first, like a click does it
    if let Some(b) = selected.and_then(|i| BRUSH_BORDERS.get(i).copied()) {
        fb.draw_rect(b.x, b.y, b.w, b.h, Color::INK);
    }
    for (i, b) in BRUSH_BORDERS.iter().enumerate() {
        if Some(i) != selected {
            fb.draw_rect(b.x, b.y, b.w, b.h, Color::BACKGROUND);
        }
    }
}

// ---------------------------------------------------------------- overlay

// 0x13 is the font's double exclamation mark.
const WELCOME: &[u8] = b"WELCOME\x13";
const WELCOME_CELL: (i32, i32) = (36, 10);
const TAGLINE: &[u8] = b"Draw Anything\x13";
const TAGLINE_CELL: (i32, i32) = (33, 11);

const REVEAL_MS: u32 = 200;
const FLASH_MS: u32 = 500;
const FLASHES: usize = 5;

const TRADEMARK: [(i32, i32, &[u8]); 4] = [
    (5, 1, b"PixelPoet"),
    (70, 0, b"v 1.1.0"),
    (54, 28, b"Founded by The BnC Corp"),
    // label inside the clear button
    (5, 24, b"Clear"),
];

fn overlay_on<B: RegisterBus>(osd: &mut OverlaySurface<B>) {
    osd.set_colors(Color::OSD_TEXT, Color::TRANSPARENT);
    osd.bypass(false);
}

pub fn draw_trademark<B: RegisterBus>(osd: &mut OverlaySurface<B>) {
    overlay_on(osd);
    for (x, y, text) in TRADEMARK {
        osd.write_text(x, y, text);
    }
}

fn draw_banner<B: RegisterBus>(osd: &mut OverlaySurface<B>) {
    osd.write_text(WELCOME_CELL.0, WELCOME_CELL.1, WELCOME);
    osd.write_text(TAGLINE_CELL.0, TAGLINE_CELL.1, TAGLINE);
}

/// Blank the welcome banner cells; the rest of the overlay is untouched.
pub fn dismiss_welcome<B: RegisterBus>(osd: &mut OverlaySurface<B>) {
    for (cell, text) in [(WELCOME_CELL, WELCOME), (TAGLINE_CELL, TAGLINE)] {
        for i in 0..text.len() as i32 {
            osd.write_char(cell.0 + i, cell.1, NULL_GLYPH, false);
        }
    }
}

/// Blocking intro: reveal "WELCOME!!" glyph by glyph, show the tagline, then
/// flash both lines.
pub fn show_welcome<B: RegisterBus>(osd: &mut OverlaySurface<B>, delay: &mut impl DelayNs) {
    overlay_on(osd);
    osd.clear();
    draw_trademark(osd);

    for (i, &glyph) in WELCOME.iter().enumerate() {
        osd.write_char(WELCOME_CELL.0 + i as i32, WELCOME_CELL.1, glyph, false);
        delay.delay_ms(REVEAL_MS);
    }
    osd.write_text(TAGLINE_CELL.0, TAGLINE_CELL.1, TAGLINE);
    delay.delay_ms(REVEAL_MS);

    for _ in 0..FLASHES {
        dismiss_welcome(osd);
        delay.delay_ms(FLASH_MS);
        draw_banner(osd);
        delay.delay_ms(FLASH_MS);
    }
}

const NO_MOUSE: &[u8] = b"NO MOUSE";

/// Shown in place of the banner when no pointer could be brought up.
pub fn show_no_mouse<B: RegisterBus>(osd: &mut OverlaySurface<B>) {
    overlay_on(osd);
    osd.write_text(36, 14, NO_MOUSE);
}
