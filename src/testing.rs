//! Hand-written fakes shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};

use crate::bus::RegisterBus;
use crate::color::Color;
use crate::input::{Accelerometer, AnalogInput, Knob, PointerDevice, PointerSample};
use crate::ps2_mouse::Ps2Port;
use crate::wiring::FRAME_BASE;

/// Register bus that models device memory and keeps every write in order.
#[derive(Default)]
pub struct MemoryBus {
    mem: HashMap<(u32, u32), u32>,
    pub log: Vec<(u32, u32, u32)>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, base: u32, offset: u32) -> Option<u32> {
        self.mem.get(&(base, offset)).copied()
    }

    /// Framebuffer pixel at (x,y), if it was ever written.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.read(FRAME_BASE, (640 * y + x) as u32)
            .map(|v| Color::from_raw(v as u16))
    }

    /// Writes that went to the window at `base`, in order.
    pub fn writes_to(&self, base: u32) -> Vec<(u32, u32)> {
        self.log
            .iter()
            .filter(|(b, _, _)| *b == base)
            .map(|&(_, o, v)| (o, v))
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl RegisterBus for MemoryBus {
    fn write(&mut self, base: u32, offset: u32, value: u32) {
        self.mem.insert((base, offset), value);
        self.log.push((base, offset, value));
    }
}

/// SPI device that records each transaction's written bytes and answers
/// ADXL362-style register commands (`0x0A` write, `0x0B` read) from `regs`.
#[derive(Default)]
pub struct FakeSpi {
    pub frames: Vec<Vec<u8>>,
    pub regs: HashMap<u8, u8>,
    pub fail: bool,
}

impl ErrorType for FakeSpi {
    type Error = ErrorKind;
}

impl SpiDevice<u8> for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        let mut frame = Vec::new();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(buf) => frame.extend_from_slice(buf),
                Operation::Read(buf) => {
                    let (cmd, start) = (frame.first().copied(), frame.get(1).copied());
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = match (cmd, start) {
                            (Some(0x0B), Some(reg)) => {
                                self.regs.get(&(reg + i as u8)).copied().unwrap_or(0)
                            }
                            _ => 0,
                        };
                    }
                }
                Operation::Transfer(read, write) => {
                    frame.extend_from_slice(write);
                    read.fill(0);
                }
                Operation::TransferInPlace(buf) => {
                    frame.extend_from_slice(buf);
                    buf.fill(0);
                }
                Operation::DelayNs(_) => {}
            }
        }
        if let [0x0A, reg, data @ ..] = frame.as_slice() {
            for (i, d) in data.iter().enumerate() {
                self.regs.insert(reg + i as u8, *d);
            }
        }
        self.frames.push(frame);
        Ok(())
    }
}

/// Pointer that replays a script, then reports nothing.
#[derive(Default)]
pub struct ScriptedPointer {
    pub samples: VecDeque<Option<PointerSample>>,
}

impl ScriptedPointer {
    pub fn new(samples: impl IntoIterator<Item = Option<PointerSample>>) -> Self {
        Self { samples: samples.into_iter().collect() }
    }
}

impl PointerDevice for ScriptedPointer {
    fn poll(&mut self) -> Option<PointerSample> {
        self.samples.pop_front().flatten()
    }
}

/// Knobs that replay per-channel scripts and hold their last value.
pub struct ScriptedKnobs {
    pub color: VecDeque<f64>,
    pub brush: VecDeque<f64>,
    last: [f64; 2],
}

impl ScriptedKnobs {
    pub fn new(color: &[f64], brush: &[f64]) -> Self {
        Self {
            color: color.iter().copied().collect(),
            brush: brush.iter().copied().collect(),
            last: [0.0; 2],
        }
    }

    /// Knobs that sit still at zero.
    pub fn idle() -> Self {
        Self::new(&[], &[])
    }
}

impl AnalogInput for ScriptedKnobs {
    fn read(&mut self, knob: Knob) -> f64 {
        let (queue, slot) = match knob {
            Knob::Color => (&mut self.color, 0),
            Knob::Brush => (&mut self.brush, 1),
        };
        if let Some(v) = queue.pop_front() {
            self.last[slot] = v;
        }
        self.last[slot]
    }
}

/// Accelerometer that replays magnitudes and holds the last one.
#[derive(Default)]
pub struct ScriptedAccel {
    pub values: VecDeque<f32>,
    last: f32,
}

impl ScriptedAccel {
    pub fn new(values: &[f32]) -> Self {
        Self { values: values.iter().copied().collect(), last: 0.0 }
    }
}

impl Accelerometer for ScriptedAccel {
    fn read_magnitude(&mut self) -> f32 {
        if let Some(v) = self.values.pop_front() {
            self.last = v;
        }
        self.last
    }
}

/// Delay that only records what was asked of it.
#[derive(Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
    pub ms_calls: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms_calls.push(ms);
        self.total_ns += ms as u64 * 1_000_000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortFault;

/// PS/2 line that hands out queued bytes and records what the host sent.
#[derive(Default)]
pub struct ScriptedPs2Port {
    pub incoming: VecDeque<u8>,
    pub sent: Vec<u8>,
    pub fail_send: bool,
}

impl ScriptedPs2Port {
    pub fn new(incoming: &[u8]) -> Self {
        Self { incoming: incoming.iter().copied().collect(), ..Self::default() }
    }

    /// A mouse that answers reset and enable the normal way.
    pub fn healthy_mouse() -> Self {
        Self::new(&[0xFA, 0xAA, 0x00, 0xFA])
    }
}

impl Ps2Port for ScriptedPs2Port {
    type Error = PortFault;

    fn send(&mut self, byte: u8) -> Result<(), PortFault> {
        if self.fail_send {
            return Err(PortFault);
        }
        self.sent.push(byte);
        Ok(())
    }

    fn recv(&mut self) -> Result<Option<u8>, PortFault> {
        Ok(self.incoming.pop_front())
    }
}

pub fn sample(left: bool, right: bool, dx: i16, dy: i16) -> PointerSample {
    PointerSample { left, right, dx, dy }
}
