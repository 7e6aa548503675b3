//! Sprite and filter cores.
//!
//! A sprite is a 32x32 bitmap (1024 words, row-major) plus a position
//! register pair. The filter cores (bar generator, grayscale) only expose
//! raw memory and the bypass switch.

use crate::bus::RegisterBus;
use crate::color::Color;

pub const SPRITE_SIZE: i32 = 32;
pub const SPRITE_WORDS: u32 = (SPRITE_SIZE * SPRITE_SIZE) as u32;

const BYPASS_REG: u32 = 0x2000;
const X_REG: u32 = 0x2001;
const Y_REG: u32 = 0x2002;
const CTRL_REG: u32 = 0x2003;

pub struct SpriteSurface<B> {
    bus: B,
    base: u32,
}

impl<B: RegisterBus> SpriteSurface<B> {
    pub fn new(bus: B, base: u32) -> Self {
        Self { bus, base }
    }

    /// Position the top-left corner; X lands before Y.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.bus.write(self.base, X_REG, x as u32);
        self.bus.write(self.base, Y_REG, y as u32);
    }

    /// Core-specific control word (animation, palette select).
    pub fn write_control(&mut self, cmd: u32) {
        self.bus.write(self.base, CTRL_REG, cmd);
    }

    pub fn bypass(&mut self, on: bool) {
        self.bus.write(self.base, BYPASS_REG, on as u32);
    }

    /// Store one bitmap word; addresses past the bitmap are dropped.
    pub fn write_mem(&mut self, addr: u32, color: Color) {
        if addr < SPRITE_WORDS {
            self.bus.write(self.base, addr, color.raw() as u32);
        }
    }

    pub fn fill_row(&mut self, row: i32, color: Color) {
        if !(0..SPRITE_SIZE).contains(&row) {
            return;
        }
        let start = (row * SPRITE_SIZE) as u32;
        for addr in start..start + SPRITE_SIZE as u32 {
            self.write_mem(addr, color);
        }
    }
}

pub struct FilterLayer<B> {
    bus: B,
    base: u32,
}

impl<B: RegisterBus> FilterLayer<B> {
    pub fn new(bus: B, base: u32) -> Self {
        Self { bus, base }
    }

    pub fn bypass(&mut self, on: bool) {
        self.bus.write(self.base, BYPASS_REG, on as u32);
    }

    pub fn write_mem(&mut self, addr: u32, value: u32) {
        self.bus.write(self.base, addr, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryBus;
    use crate::wiring::{video_addr, V1_MOUSE, V7_BAR};
    use core::cell::RefCell;

    const MOUSE: u32 = video_addr(V1_MOUSE);

    #[test]
    fn move_writes_x_then_y() {
        let bus = RefCell::new(MemoryBus::new());
        let mut sprite = SpriteSurface::new(&bus, MOUSE);
        sprite.move_to(320, 240);
        sprite.write_control(3);
        assert_eq!(
            bus.borrow().log,
            vec![(MOUSE, 0x2001, 320), (MOUSE, 0x2002, 240), (MOUSE, 0x2003, 3)]
        );
    }

    #[test]
    fn bitmap_writes_stop_at_1024() {
        let bus = RefCell::new(MemoryBus::new());
        let mut sprite = SpriteSurface::new(&bus, MOUSE);
        sprite.write_mem(1023, Color::RED);
        sprite.write_mem(1024, Color::RED);
        sprite.write_mem(0x2001, Color::RED);
        assert_eq!(bus.borrow().log, vec![(MOUSE, 1023, 0xf00)]);
    }

    #[test]
    fn fill_row_covers_one_row() {
        let bus = RefCell::new(MemoryBus::new());
        let mut sprite = SpriteSurface::new(&bus, MOUSE);
        sprite.fill_row(2, Color::WHITE);
        sprite.fill_row(32, Color::WHITE);
        let offsets: Vec<u32> = bus.borrow().log.iter().map(|w| w.1).collect();
        assert_eq!(offsets, (64..96).collect::<Vec<u32>>());
    }

    #[test]
    fn filter_layer_passes_raw_words() {
        let bus = RefCell::new(MemoryBus::new());
        let mut bar = FilterLayer::new(&bus, video_addr(V7_BAR));
        bar.bypass(true);
        bar.write_mem(7, 0xdead);
        let base = video_addr(V7_BAR);
        assert_eq!(bus.borrow().log, vec![(base, 0x2000, 1), (base, 7, 0xdead)]);
    }
}
