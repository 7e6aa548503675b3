//! Packed 12-bit color, the shared linear mapping and the hue sweep.
//!
//! The video cores take 4 bits per channel, concatenated red-green-blue from
//! high to low. Every analog-to-visual conversion in the crate goes through
//! [`map_range`]: knob to LED duty, knob to channel nibble, knob to brush
//! radius.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color(u16);

impl Color {
    /// Overlay chroma key: transparent on the OSD layer.
    pub const TRANSPARENT: Color = Color(0x000);
    /// Near-black used for borders and ink on the frame buffer.
    pub const INK: Color = Color(0x001);
    pub const OSD_TEXT: Color = Color(0x111);
    pub const WHITE: Color = Color(0xfff);
    pub const RED: Color = Color(0xf00);
    pub const GREEN: Color = Color(0x0f0);
    /// Frame color around the canvas.
    pub const BACKGROUND: Color = Color(0xA8B);

    /// Build from a packed value; bits above the low 12 are discarded.
    pub const fn from_raw(raw: u16) -> Self {
        Color(raw & 0x0fff)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color((((r & 0xf) as u16) << 8) | (((g & 0xf) as u16) << 4) | ((b & 0xf) as u16))
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn r(self) -> u8 {
        ((self.0 >> 8) & 0xf) as u8
    }

    pub const fn g(self) -> u8 {
        ((self.0 >> 4) & 0xf) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 & 0xf) as u8
    }

    /// Quantize normalized spectrum levels to channel nibbles.
    pub fn from_levels(levels: Levels) -> Self {
        Color::from_rgb(
            level_to_nibble(levels.red),
            level_to_nibble(levels.green),
            level_to_nibble(levels.blue),
        )
    }
}

// 8-bit channels keep their top nibble.
impl From<Rgb888> for Color {
    fn from(c: Rgb888) -> Self {
        Color::from_rgb(c.r() >> 4, c.g() >> 4, c.b() >> 4)
    }
}

impl From<Color> for Rgb888 {
    fn from(c: Color) -> Self {
        Rgb888::new(c.r() * 0x11, c.g() * 0x11, c.b() * 0x11)
    }
}

/// Linear interpolation of `value` from `[in_min, in_max]` onto
/// `[out_min, out_max]`. Not clamped; `in_min` must differ from `in_max`.
#[inline]
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

// Spectrum levels never reach the rails so the nibble mapping stays in range.
pub const LEVEL_FLOOR: f64 = 0.03;
pub const LEVEL_MAX: f64 = 0.999;

fn level_to_nibble(level: f64) -> u8 {
    // `as` truncates toward zero and saturates, so levels under the floor land on 0.
    let n = map_range(level, LEVEL_FLOOR, LEVEL_MAX, 0.0, 15.0) as u8;
    n.min(0xf)
}

/// Per-channel intensities in `[LEVEL_FLOOR, LEVEL_MAX]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Levels {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

/// PWM duty cycles in `[0, 1]` for an RGB indicator LED.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Duty {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

/// Result of one hue-sweep lookup.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spectrum {
    pub levels: Levels,
    pub duty: Duty,
}

/// Sink for the LED duty cycles computed alongside a knob color.
pub trait RgbIndicator {
    fn set_duty(&mut self, duty: Duty);
}

/// No indicator attached.
impl RgbIndicator for () {
    fn set_duty(&mut self, _duty: Duty) {}
}

// Segment edges, each its own quotient so boundaries land where a knob
// reading of exactly n/6 expects them.
const S1: f64 = 1.0 / 6.0;
const S2: f64 = 2.0 / 6.0;
const S3: f64 = 3.0 / 6.0;
const S4: f64 = 4.0 / 6.0;
const S5: f64 = 5.0 / 6.0;

/// Hue sweep over a knob position in `[0, 1]`.
///
/// Six equal segments; each varies one channel while one is held at max and
/// the other at the floor: red→yellow→green→cyan→blue→magenta→red.
pub fn spectrum(pot: f64) -> Spectrum {
    let p = pot.clamp(0.0, 1.0);
    let (lo, hi) = (LEVEL_FLOOR, LEVEL_MAX);

    let rise = |a: f64, b: f64| map_range(p, a, b, lo, hi);
    let fall = |a: f64, b: f64| map_range(p, a, b, hi, lo);
    let rise_duty = |a: f64, b: f64| map_range(p, a, b, 0.0, 1.0);
    let fall_duty = |a: f64, b: f64| map_range(p, a, b, 1.0, 0.0);

    let (levels, duty) = if p <= S1 {
        (
            Levels { red: hi, green: rise(0.0, S1), blue: lo },
            Duty { red: 1.0, green: rise_duty(0.0, S1), blue: 0.0 },
        )
    } else if p <= S2 {
        // LED red drops out early to smooth the hand-off to green
        let red_duty = if p >= 0.33 { 0.0 } else { fall_duty(S1, S2) };
        (
            Levels { red: fall(S1, S2), green: hi, blue: lo },
            Duty { red: red_duty, green: 1.0, blue: 0.0 },
        )
    } else if p <= S3 {
        (
            Levels { red: lo, green: hi, blue: rise(S2, S3) },
            Duty { red: 0.0, green: 1.0, blue: rise_duty(S2, S3) },
        )
    } else if p <= S4 {
        let green_duty = if p >= 0.66 { 0.0 } else { fall_duty(S3, S4) };
        (
            Levels { red: lo, green: fall(S3, S4), blue: hi },
            Duty { red: 0.0, green: green_duty, blue: 1.0 },
        )
    } else if p <= S5 {
        (
            Levels { red: rise(S4, S5), green: lo, blue: hi },
            Duty { red: rise_duty(S4, S5), green: 0.0, blue: 1.0 },
        )
    } else {
        (
            Levels { red: hi, green: lo, blue: fall(S5, 1.0) },
            Duty { red: 1.0, green: 0.0, blue: fall_duty(S5, 1.0) },
        )
    };

    Spectrum { levels, duty }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        libm::fabs(a - b) < 1e-9
    }

    fn knob_color(pot: f64) -> u16 {
        Color::from_levels(spectrum(pot).levels).raw()
    }

    #[test]
    fn map_range_round_trips() {
        let cases = [
            (0.5, 0.0, 1.0, 10.0, 20.0),
            (0.2, 0.03, 0.999, 0.0, 15.0),
            (7.0, -3.0, 12.0, 1.0, -1.0),
            (0.9, 1.0, 0.0, 0.0, 100.0),
        ];
        for (v, a, b, c, d) in cases {
            let there = map_range(v, a, b, c, d);
            let back = map_range(there, c, d, a, b);
            assert!(close(back, v), "{v} -> {there} -> {back}");
        }
    }

    #[test]
    fn packs_channels_high_to_low() {
        let c = Color::from_rgb(0xA, 0x8, 0xB);
        assert_eq!(c, Color::BACKGROUND);
        assert_eq!((c.r(), c.g(), c.b()), (0xA, 0x8, 0xB));
        assert_eq!(Color::from_raw(0xffff).raw(), 0x0fff);
    }

    #[test]
    fn rgb888_conversion_keeps_top_nibble() {
        let c: Color = Rgb888::new(0xF3, 0x80, 0x0F).into();
        assert_eq!(c.raw(), 0xf80);
        let back: Rgb888 = Color::from_raw(0xf80).into();
        assert_eq!(back, Rgb888::new(0xFF, 0x88, 0x00));
    }

    #[test]
    fn spectrum_endpoints_are_red() {
        assert_eq!(knob_color(0.0), 0xf00);
        assert_eq!(knob_color(1.0), 0xf00);
    }

    #[test]
    fn spectrum_segment_boundaries() {
        // the rising channel stops a hair short of 15 at the segment end
        assert_eq!(knob_color(1.0 / 6.0), 0xfe0);
        assert_eq!(knob_color(2.0 / 6.0), 0x0f0);
        assert_eq!(knob_color(0.5), 0x0ff);
        assert_eq!(knob_color(4.0 / 6.0), 0x00f);
        assert_eq!(knob_color(5.0 / 6.0), 0xf0f);
    }

    #[test]
    fn nibbles_truncate_without_rounding_up() {
        // each of these lands just under a whole nibble
        assert_eq!(knob_color(0.2), 0xbf0);
        assert_eq!(knob_color(182.0 / 4095.0), 0xf30);
        assert_eq!(knob_color(2275.0 / 4095.0), 0x09f);
        assert_eq!(knob_color(3367.0 / 4095.0), 0xd0f);
        // a 12-bit reading that went through f32 on its way in
        assert_eq!(knob_color((728.0f32 / 4095.0) as f64), 0xdf0);
    }

    #[test]
    fn spectrum_holds_one_max_and_one_floor() {
        for i in 0..=100 {
            let s = spectrum(i as f64 / 100.0).levels;
            let ch = [s.red, s.green, s.blue];
            assert!(ch.iter().any(|&v| close(v, LEVEL_MAX)), "no max at {i}");
            assert!(ch.iter().any(|&v| close(v, LEVEL_FLOOR)), "no floor at {i}");
            assert!(ch.iter().all(|&v| v >= LEVEL_FLOOR - 1e-9 && v <= LEVEL_MAX + 1e-9));
        }
    }

    #[test]
    fn led_duty_smoothing_cutoffs() {
        assert_eq!(spectrum(0.332).duty.red, 0.0);
        assert!(spectrum(0.2).duty.red > 0.0);
        assert_eq!(spectrum(0.665).duty.green, 0.0);
        assert!(spectrum(0.55).duty.green > 0.0);
    }

    #[test]
    fn out_of_range_knob_is_clamped() {
        assert_eq!(knob_color(-0.5), knob_color(0.0));
        assert_eq!(knob_color(3.0), knob_color(1.0));
    }
}
