//! PixelPoet firmware
//! ========================================
//! needs to be run in WSL2 terminal
//! source ~/export-esp.sh
//! ========================================
//!
//! Drives the video subsystem behind the SPI bridge as a paint program:
//! PS/2 mouse to draw, two knobs for color and brush size, shake to clear.
//! An RGB LED follows the color knob.

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![no_std]
#![no_main]

// Define the application description, which is placed in a special section of the binary.
// This is used by the bootloader to verify the application.
// The macro automatically fills in the fields.
esp_bootloader_esp_idf::esp_app_desc!();

use core::cell::RefCell;
use esp_backtrace as _;

// ESP-HAL imports
use esp_hal::{
    analog::adc::{Adc, AdcConfig, AdcPin, Attenuation},
    delay::Delay,
    gpio::Flex,
    ledc::{
        channel::{self, ChannelIFace},
        timer::{self, TimerIFace},
        LSGlobalClkSource, Ledc, LowSpeed,
    },
    main,
    peripherals::{ADC1, GPIO1, GPIO2},
    spi::{
        master::{Config as SpiConfig, Spi},
        Mode,
    },
    time::Rate,
    Blocking, Config,
};

use embedded_hal::delay::DelayNs;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_println::println;
use log::LevelFilter;

use pixelpoet::{
    adxl362::Adxl362,
    bus::SpiBridgeBus,
    color::{Duty, RgbIndicator},
    display::VideoLayers,
    input::{AnalogInput, InputFusion, Knob},
    paint::{PaintConfig, PaintController},
    ps2_mouse::{Ps2Mouse, Ps2Port},
    wiring::{init_board_pins, BoardPins},
};

// ------------------------- console logger -------------------------

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl ConsoleLogger {
    fn init(filter: LevelFilter) {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(filter);
        }
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

// ------------------------- knobs on ADC1 -------------------------

const ADC_FULL_SCALE: f64 = 4095.0;
const ADC_MAX_SPINS: u32 = 10_000;

struct Knobs<'d> {
    adc: Adc<'d, ADC1<'d>, Blocking>,
    color: AdcPin<GPIO1<'d>, ADC1<'d>>,
    brush: AdcPin<GPIO2<'d>, ADC1<'d>>,
    // last good reading per channel
    last: [f64; 2],
}

impl<'d> Knobs<'d> {
    fn new(adc1: ADC1<'d>, color: GPIO1<'d>, brush: GPIO2<'d>) -> Self {
        let mut cfg = AdcConfig::new();
        let color = cfg.enable_pin(color, Attenuation::_11dB);
        let brush = cfg.enable_pin(brush, Attenuation::_11dB);
        Self { adc: Adc::new(adc1, cfg), color, brush, last: [0.0; 2] }
    }
}

impl AnalogInput for Knobs<'_> {
    fn read(&mut self, knob: Knob) -> f64 {
        let slot = knob.channel() as usize;
        for _ in 0..ADC_MAX_SPINS {
            let sample = match knob {
                Knob::Color => self.adc.read_oneshot(&mut self.color),
                Knob::Brush => self.adc.read_oneshot(&mut self.brush),
            };
            if let Ok(raw) = sample {
                self.last[slot] = (raw as f64 / ADC_FULL_SCALE).clamp(0.0, 1.0);
                return self.last[slot];
            }
        }
        log::warn!("adc channel {} busy, reusing last reading", slot);
        self.last[slot]
    }
}

// ------------------------- RGB LED on LEDC -------------------------

const LED_PWM_HZ: u32 = 50;

struct RgbLed<'a> {
    red: channel::Channel<'a, LowSpeed>,
    green: channel::Channel<'a, LowSpeed>,
    blue: channel::Channel<'a, LowSpeed>,
}

fn duty_pct(duty: f64) -> u8 {
    (duty.clamp(0.0, 1.0) * 100.0) as u8
}

impl RgbIndicator for RgbLed<'_> {
    fn set_duty(&mut self, duty: Duty) {
        let outputs = [
            (&mut self.red, duty.red),
            (&mut self.green, duty.green),
            (&mut self.blue, duty.blue),
        ];
        for (ch, d) in outputs {
            if let Err(e) = ch.set_duty(duty_pct(d)) {
                log::warn!("led duty {} rejected: {:?}", d, e);
            }
        }
    }
}

// ------------------------- bit-banged PS/2 host -------------------------

#[derive(Debug, PartialEq)]
enum LineError {
    Timeout,
    Framing,
    Parity,
    NoAck,
}

// Both lines are open-drain: set_high releases, set_low pulls down.
// Between transfers the clock is held low so the device buffers its bytes.
struct GpioPs2Port<'d> {
    clk: Flex<'d>,
    data: Flex<'d>,
    delay: Delay,
}

// Device clock runs at 10-16.7 kHz, so no half period exceeds ~50 us.
const HALF_CLOCK_US: u32 = 100;
// After a request-to-send the device has up to 15 ms to start clocking.
const RTS_START_US: u32 = 15_000;
// How long a poll waits for the device to start a frame.
const LISTEN_US: u32 = 200;

impl<'d> GpioPs2Port<'d> {
    fn new(clk: Flex<'d>, data: Flex<'d>) -> Self {
        let mut port = Self { clk, data, delay: Delay::new() };
        port.inhibit();
        port
    }

    fn inhibit(&mut self) {
        self.data.set_high();
        self.clk.set_low();
    }

    fn wait_clk(&mut self, high: bool, timeout_us: u32) -> Result<(), LineError> {
        for _ in 0..timeout_us {
            if self.clk.is_high() == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(LineError::Timeout)
    }

    // Clocked in on falling edges; the clock is low on entry (start bit).
    fn read_frame(&mut self) -> Result<u8, LineError> {
        if self.data.is_high() {
            return Err(LineError::Framing);
        }
        self.wait_clk(true, HALF_CLOCK_US)?;

        let mut byte = 0u8;
        let mut ones = 0u32;
        for i in 0..8 {
            self.wait_clk(false, HALF_CLOCK_US)?;
            if self.data.is_high() {
                byte |= 1 << i;
                ones += 1;
            }
            self.wait_clk(true, HALF_CLOCK_US)?;
        }

        self.wait_clk(false, HALF_CLOCK_US)?;
        let parity = self.data.is_high();
        self.wait_clk(true, HALF_CLOCK_US)?;

        self.wait_clk(false, HALF_CLOCK_US)?;
        let stop = self.data.is_high();
        self.wait_clk(true, HALF_CLOCK_US)?;

        // odd parity over data + parity bit
        if (ones + parity as u32) % 2 != 1 {
            return Err(LineError::Parity);
        }
        if !stop {
            return Err(LineError::Framing);
        }
        Ok(byte)
    }

    // Device samples on rising edges; we change data while the clock is low.
    fn write_frame(&mut self, byte: u8) -> Result<(), LineError> {
        self.wait_clk(false, RTS_START_US)?;

        let mut parity = true;
        for i in 0..9 {
            let bit = if i < 8 { byte & (1 << i) != 0 } else { parity };
            if bit {
                self.data.set_high();
            } else {
                self.data.set_low();
            }
            if i < 8 && bit {
                parity = !parity;
            }
            self.wait_clk(true, HALF_CLOCK_US)?;
            self.wait_clk(false, HALF_CLOCK_US)?;
        }

        // stop bit, then the device acks by pulling data low for one clock
        self.data.set_high();
        self.wait_clk(true, HALF_CLOCK_US)?;
        self.wait_clk(false, HALF_CLOCK_US)?;
        let acked = self.data.is_low();
        self.wait_clk(true, HALF_CLOCK_US)?;

        if acked {
            Ok(())
        } else {
            Err(LineError::NoAck)
        }
    }
}

impl Ps2Port for GpioPs2Port<'_> {
    type Error = LineError;

    fn send(&mut self, byte: u8) -> Result<(), LineError> {
        // request to send
        self.clk.set_low();
        self.delay.delay_us(100);
        self.data.set_low();
        self.clk.set_high();

        let res = self.write_frame(byte);
        self.inhibit();
        res
    }

    fn recv(&mut self) -> Result<Option<u8>, LineError> {
        self.clk.set_high();
        if self.wait_clk(false, LISTEN_US).is_err() {
            self.inhibit();
            return Ok(None);
        }
        let res = self.read_frame();
        self.inhibit();
        res.map(Some)
    }
}

// ------------------------- entry point -------------------------

#[main]
fn main() -> ! {
    let peripherals = esp_hal::init(Config::default());
    ConsoleLogger::init(LevelFilter::Info);

    let BoardPins {
        bridge_spi,
        bridge_sck,
        bridge_mosi,
        bridge_miso,
        bridge_cs,
        accel_spi,
        accel_sck,
        accel_mosi,
        accel_miso,
        accel_cs,
        adc1,
        knob_color,
        knob_brush,
        ledc,
        led_red,
        led_green,
        led_blue,
        ps2_clk,
        ps2_data,
    } = init_board_pins(peripherals);

    let mut delay = Delay::new();

    // Video bridge @ 20 MHz, Mode 0
    let spi = Spi::new(
        bridge_spi,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(20))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(bridge_sck)
    .with_mosi(bridge_mosi)
    .with_miso(bridge_miso);
    let bridge = RefCell::new(SpiBridgeBus::new(
        ExclusiveDevice::new(spi, bridge_cs, NoDelay).unwrap(),
    ));
    let layers = VideoLayers::new(&bridge);

    // ADXL362 @ 1 MHz, Mode 0
    let spi = Spi::new(
        accel_spi,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(1))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(accel_sck)
    .with_mosi(accel_mosi)
    .with_miso(accel_miso);
    let accel = match Adxl362::new(ExclusiveDevice::new(spi, accel_cs, NoDelay).unwrap()) {
        Ok(a) => Some(a),
        Err(e) => {
            log::error!("ADXL362 init failed, shake disabled: {:?}", e);
            None
        }
    };

    let knobs = Knobs::new(adc1, knob_color, knob_brush);

    // RGB LED, 10-bit duty @ 50 Hz
    let mut ledc = Ledc::new(ledc);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let mut led_timer = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    led_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty10Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: Rate::from_hz(LED_PWM_HZ),
        })
        .unwrap();
    let led_config = || channel::config::Config {
        timer: &led_timer,
        duty_pct: 0,
        pin_config: channel::config::PinConfig::PushPull,
    };
    let mut red = ledc.channel(channel::Number::Channel0, led_red);
    red.configure(led_config()).unwrap();
    let mut green = ledc.channel(channel::Number::Channel1, led_green);
    green.configure(led_config()).unwrap();
    let mut blue = ledc.channel(channel::Number::Channel2, led_blue);
    blue.configure(led_config()).unwrap();
    let led = RgbLed { red, green, blue };

    let mouse = match Ps2Mouse::init(GpioPs2Port::new(ps2_clk, ps2_data), &mut delay) {
        Ok(m) => Some(m),
        Err(e) => {
            log::error!("PS/2 mouse identification failed: {:?}", e);
            None
        }
    };

    let config = PaintConfig::default();
    let mut input = InputFusion::new(mouse, knobs, accel, &config);
    let mut controller = PaintController::new(layers, led, config);

    controller.start(&mut delay, input.has_pointer());

    loop {
        controller.tick(&mut input);
    }
}
