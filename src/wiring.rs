// Board memory map and pin assignments.
//
// The video subsystem sits behind a bridge window. Each video core owns a
// 0x4000-byte slot above the video base; the frame buffer has its own
// 19-bit window.
//
//   BRIDGE_BASE          0xC000_0000
//   frame buffer         BRIDGE_BASE + 0x0080_0000
//   video slot n         BRIDGE_BASE + 0x00C0_0000 + n * 0x4000
//
//! Video slot assignment:
//! - V1 => mouse pointer sprite
//! - V2 => on-screen display (character overlay)
//! - V3 => ghost sprite
//! - V6 => grayscale filter
//! - V7 => bar pattern generator
//!
//! With the `firmware` feature the ESP32-S3 pins for the SPI bridge, the
//! accelerometer, the two knobs, the RGB LED and the PS/2 port are mapped
//! here as well.

pub const BRIDGE_BASE: u32 = 0xC000_0000;
pub const FRAME_BASE: u32 = BRIDGE_BASE + 0x0080_0000;
const VIDEO_BASE: u32 = BRIDGE_BASE + 0x00C0_0000;

// Video slots
pub const V1_MOUSE: u32 = 1;
pub const V2_OSD: u32 = 2;
pub const V3_GHOST: u32 = 3;
pub const V6_GRAY: u32 = 6;
pub const V7_BAR: u32 = 7;

#[inline]
pub const fn video_addr(slot: u32) -> u32 {
    VIDEO_BASE + slot * 0x4000
}

#[cfg(feature = "firmware")]
pub use board::*;

#[cfg(feature = "firmware")]
mod board {
    use esp_hal::gpio::{
        DriveMode, Flex, InputConfig, Level, Output, OutputConfig, Pull,
    };
    use esp_hal::peripherals::{
        Peripherals, ADC1, GPIO1, GPIO11, GPIO12, GPIO13, GPIO17, GPIO18, GPIO2, GPIO21, GPIO4,
        GPIO5, GPIO6, LEDC, SPI2, SPI3,
    };

    // Everything the firmware needs, already split out of `Peripherals`.
    pub struct BoardPins<'a> {
        // SPI bridge to the video subsystem
        pub bridge_spi: SPI2<'a>,
        pub bridge_sck: GPIO12<'a>,
        pub bridge_mosi: GPIO11<'a>,
        pub bridge_miso: GPIO13<'a>,
        pub bridge_cs: Output<'a>, // GPIO10

        // ADXL362 accelerometer
        pub accel_spi: SPI3<'a>,
        pub accel_sck: GPIO4<'a>,
        pub accel_mosi: GPIO5<'a>,
        pub accel_miso: GPIO6<'a>,
        pub accel_cs: Output<'a>, // GPIO7

        // Knobs on ADC1
        pub adc1: ADC1<'a>,
        pub knob_color: GPIO1<'a>,
        pub knob_brush: GPIO2<'a>,

        // RGB LED, one LEDC channel per color
        pub ledc: LEDC<'a>,
        pub led_red: GPIO17<'a>,
        pub led_green: GPIO18<'a>,
        pub led_blue: GPIO21<'a>,

        // PS/2 mouse, both lines open-drain with pull-ups
        pub ps2_clk: Flex<'a>,  // GPIO15
        pub ps2_data: Flex<'a>, // GPIO16
    }

    fn open_drain<'a>(mut pin: Flex<'a>) -> Flex<'a> {
        pin.apply_input_config(&InputConfig::default().with_pull(Pull::Up));
        pin.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        pin.set_high();
        pin.set_input_enable(true);
        pin.set_output_enable(true);
        pin
    }

    pub fn init_board_pins(p: Peripherals) -> BoardPins<'static> {
        let bridge_cs = Output::new(p.GPIO10, Level::High, OutputConfig::default());
        let accel_cs = Output::new(p.GPIO7, Level::High, OutputConfig::default());

        BoardPins {
            bridge_spi: p.SPI2,
            bridge_sck: p.GPIO12,
            bridge_mosi: p.GPIO11,
            bridge_miso: p.GPIO13,
            bridge_cs,
            accel_spi: p.SPI3,
            accel_sck: p.GPIO4,
            accel_mosi: p.GPIO5,
            accel_miso: p.GPIO6,
            accel_cs,
            adc1: p.ADC1,
            knob_color: p.GPIO1,
            knob_brush: p.GPIO2,
            ledc: p.LEDC,
            led_red: p.GPIO17,
            led_green: p.GPIO18,
            led_blue: p.GPIO21,
            ps2_clk: open_drain(Flex::new(p.GPIO15)),
            ps2_data: open_drain(Flex::new(p.GPIO16)),
        }
    }
}
