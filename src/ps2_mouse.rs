//! PS/2 mouse over an abstract byte port.
//!
//! Bring-up is the usual reset / self-test / identify / enable-reporting
//! exchange. After that the device streams 3-byte packets:
//! - byte 0: buttons (bits 0..2), always-one sync bit 3, sign bits 4/5,
//!   overflow bits 6/7
//! - byte 1: X movement
//! - byte 2: Y movement, positive = up

use embedded_hal::delay::DelayNs;

use crate::input::{PointerDevice, PointerSample};

const CMD_RESET: u8 = 0xFF;
const CMD_ENABLE_REPORTING: u8 = 0xF4;

const RESP_ACK: u8 = 0xFA;
const RESP_SELF_TEST_PASSED: u8 = 0xAA;
const ID_STANDARD_MOUSE: u8 = 0x00;

// Self-test can take most of a second after power-on.
const RESET_TIMEOUT_MS: u32 = 1000;
const REPLY_TIMEOUT_MS: u32 = 25;
const POLL_INTERVAL_US: u32 = 100;

/// Raw byte link to a PS/2 device. `recv` never blocks.
pub trait Ps2Port {
    type Error: core::fmt::Debug;

    fn send(&mut self, byte: u8) -> Result<(), Self::Error>;
    fn recv(&mut self) -> Result<Option<u8>, Self::Error>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum Ps2Error<E> {
    Port(E),
    /// No reply in time to the command shown.
    Timeout(u8),
    Unexpected { expected: u8, got: u8 },
    /// Device identified as something other than a plain mouse.
    NotAMouse(u8),
}

impl<E> From<E> for Ps2Error<E> {
    fn from(e: E) -> Self {
        Ps2Error::Port(e)
    }
}

/// Reassembles the 3-byte stream into samples.
#[derive(Default)]
pub struct PacketDecoder {
    buf: [u8; 3],
    idx: usize,
}

impl PacketDecoder {
    pub const fn new() -> Self {
        Self { buf: [0; 3], idx: 0 }
    }

    pub fn push(&mut self, byte: u8) -> Option<PointerSample> {
        // a first byte without the sync bit means we are mid-packet
        if self.idx == 0 && byte & 0x08 == 0 {
            return None;
        }
        self.buf[self.idx] = byte;
        self.idx += 1;
        if self.idx < 3 {
            return None;
        }
        self.idx = 0;
        Some(decode(self.buf))
    }

    pub fn reset(&mut self) {
        self.idx = 0;
    }
}

fn axis(raw: u8, negative: bool, overflow: bool) -> i16 {
    match (overflow, negative) {
        (true, true) => -256,
        (true, false) => 255,
        (false, true) => raw as i16 - 256,
        (false, false) => raw as i16,
    }
}

fn decode([status, x, y]: [u8; 3]) -> PointerSample {
    PointerSample {
        left: status & 0x01 != 0,
        right: status & 0x02 != 0,
        dx: axis(x, status & 0x10 != 0, status & 0x40 != 0),
        dy: axis(y, status & 0x20 != 0, status & 0x80 != 0),
    }
}

pub struct Ps2Mouse<P> {
    port: P,
    decoder: PacketDecoder,
}

impl<P: Ps2Port> Ps2Mouse<P> {
    /// Reset and identify the device, then turn on streaming.
    pub fn init(mut port: P, delay: &mut impl DelayNs) -> Result<Self, Ps2Error<P::Error>> {
        port.send(CMD_RESET)?;
        expect(&mut port, delay, CMD_RESET, RESP_ACK, REPLY_TIMEOUT_MS)?;
        expect(&mut port, delay, CMD_RESET, RESP_SELF_TEST_PASSED, RESET_TIMEOUT_MS)?;
        let id = wait_byte(&mut port, delay, CMD_RESET, REPLY_TIMEOUT_MS)?;
        if id != ID_STANDARD_MOUSE {
            return Err(Ps2Error::NotAMouse(id));
        }

        port.send(CMD_ENABLE_REPORTING)?;
        expect(&mut port, delay, CMD_ENABLE_REPORTING, RESP_ACK, REPLY_TIMEOUT_MS)?;

        log::info!("ps/2 mouse ready");
        Ok(Self { port, decoder: PacketDecoder::new() })
    }

    pub fn release(self) -> P {
        self.port
    }
}

fn wait_byte<P: Ps2Port>(
    port: &mut P,
    delay: &mut impl DelayNs,
    cmd: u8,
    timeout_ms: u32,
) -> Result<u8, Ps2Error<P::Error>> {
    let tries = timeout_ms * (1000 / POLL_INTERVAL_US);
    for _ in 0..tries {
        if let Some(b) = port.recv()? {
            return Ok(b);
        }
        delay.delay_us(POLL_INTERVAL_US);
    }
    Err(Ps2Error::Timeout(cmd))
}

fn expect<P: Ps2Port>(
    port: &mut P,
    delay: &mut impl DelayNs,
    cmd: u8,
    expected: u8,
    timeout_ms: u32,
) -> Result<(), Ps2Error<P::Error>> {
    match wait_byte(port, delay, cmd, timeout_ms)? {
        got if got == expected => Ok(()),
        got => Err(Ps2Error::Unexpected { expected, got }),
    }
}

impl<P: Ps2Port> PointerDevice for Ps2Mouse<P> {
    fn poll(&mut self) -> Option<PointerSample> {
        loop {
            match self.port.recv() {
                Ok(Some(b)) => {
                    if let Some(s) = self.decoder.push(b) {
                        return Some(s);
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    log::warn!("ps/2 receive error: {:?}", e);
                    self.decoder.reset();
                    return None;
                }
            }
        }
    }
}
