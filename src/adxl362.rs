//! Minimal ADXL362 bring-up over SPI and a shake-friendly magnitude read.
//! Default range (+/-2 g) with 8-bit output: roughly 63.5 counts per g.

use embedded_hal::spi::{Operation, SpiDevice};

use crate::input::Accelerometer;

const CMD_WRITE: u8 = 0x0A;
const CMD_READ: u8 = 0x0B;

const REG_DEVID_AD: u8 = 0x00;
const REG_PARTID: u8 = 0x02;
const REG_XDATA: u8 = 0x08; // XDATA, YDATA, ZDATA (8-bit, MSBs)
const REG_POWER_CTL: u8 = 0x2D;

const DEVID_AD: u8 = 0xAD;
const PARTID: u8 = 0xF2;
const POWER_CTL_MEASURE: u8 = 0x02;

const COUNTS_PER_G: f32 = 63.5;

// Accelerometer error type
#[derive(Debug)]
pub enum Adxl362Error<E> {
    Bus(E),
    BadDeviceId(u8),
    BadPartId(u8),
}

impl<E> From<E> for Adxl362Error<E> {
    fn from(e: E) -> Self {
        Adxl362Error::Bus(e)
    }
}

/// Sum of absolute axis readings in g. Cheaper than the Euclidean norm and
/// just as good for spotting a sudden jolt.
pub fn magnitude(axes: [i8; 3]) -> f32 {
    axes.iter()
        .map(|&a| libm::fabsf(a as f32 / COUNTS_PER_G))
        .sum()
}

pub struct Adxl362<SPI> {
    spi: SPI,
    last: f32,
    stale: u32,
}

impl<SPI: SpiDevice<u8>> Adxl362<SPI> {
    // Check identity and switch to measurement mode
    pub fn new(spi: SPI) -> Result<Self, Adxl362Error<SPI::Error>> {
        let mut this = Self { spi, last: 0.0, stale: 0 };

        let dev = this.read_reg(REG_DEVID_AD)?;
        if dev != DEVID_AD {
            return Err(Adxl362Error::BadDeviceId(dev));
        }
        let part = this.read_reg(REG_PARTID)?;
        if part != PARTID {
            return Err(Adxl362Error::BadPartId(part));
        }

        this.write_reg(REG_POWER_CTL, POWER_CTL_MEASURE)?;
        Ok(this)
    }

    pub fn read_reg(&mut self, reg: u8) -> Result<u8, Adxl362Error<SPI::Error>> {
        let mut out = [0u8];
        self.spi
            .transaction(&mut [Operation::Write(&[CMD_READ, reg]), Operation::Read(&mut out)])?;
        Ok(out[0])
    }

    fn write_reg(&mut self, reg: u8, val: u8) -> Result<(), Adxl362Error<SPI::Error>> {
        self.spi.write(&[CMD_WRITE, reg, val])?;
        Ok(())
    }

    /// One burst read of the three 8-bit axes.
    pub fn read_axes(&mut self) -> Result<[i8; 3], Adxl362Error<SPI::Error>> {
        let mut buf = [0u8; 3];
        self.spi.transaction(&mut [
            Operation::Write(&[CMD_READ, REG_XDATA]),
            Operation::Read(&mut buf),
        ])?;
        Ok(buf.map(|b| b as i8))
    }

    /// Reads that fell back to the previous magnitude.
    pub fn stale_reads(&self) -> u32 {
        self.stale
    }

    pub fn into_inner(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice<u8>> Accelerometer for Adxl362<SPI> {
    // A failed read repeats the last good value, which never looks like a spike.
    fn read_magnitude(&mut self) -> f32 {
        match self.read_axes() {
            Ok(axes) => {
                self.last = magnitude(axes);
            }
            Err(e) => {
                self.stale = self.stale.saturating_add(1);
                log::warn!("accelerometer read failed, reusing {}: {:?}", self.last, e);
            }
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSpi;

    fn healthy() -> FakeSpi {
        let mut spi = FakeSpi::default();
        spi.regs.insert(REG_DEVID_AD, DEVID_AD);
        spi.regs.insert(REG_PARTID, PARTID);
        spi
    }

    #[test]
    fn init_checks_ids_and_starts_measuring() {
        let acc = Adxl362::new(healthy()).unwrap_or_else(|e| panic!("{e:?}"));
        let spi = acc.into_inner();
        assert_eq!(spi.regs.get(&REG_POWER_CTL), Some(&0x02));
        assert_eq!(
            spi.frames,
            vec![vec![0x0B, 0x00], vec![0x0B, 0x02], vec![0x0A, 0x2D, 0x02]]
        );
    }

    #[test]
    fn wrong_part_is_rejected() {
        let mut spi = healthy();
        spi.regs.insert(REG_PARTID, 0xF3);
        assert!(matches!(Adxl362::new(spi), Err(Adxl362Error::BadPartId(0xF3))));

        assert!(matches!(
            Adxl362::new(FakeSpi::default()),
            Err(Adxl362Error::BadDeviceId(0x00))
        ));
    }

    #[test]
    fn magnitude_sums_absolute_axes() {
        assert_eq!(magnitude([0, 0, 0]), 0.0);
        let m = magnitude([127, -127, 0]);
        assert!((m - 4.0).abs() < 1e-6, "{m}");
    }

    #[test]
    fn failed_read_returns_last_value() {
        let mut spi = healthy();
        spi.regs.insert(0x08, 64);
        spi.regs.insert(0x09, 0);
        spi.regs.insert(0x0A, (-64i8) as u8);
        let mut acc = Adxl362::new(spi).unwrap_or_else(|e| panic!("{e:?}"));

        let good = acc.read_magnitude();
        assert!((good - 128.0 / 63.5).abs() < 1e-5);

        acc.spi.fail = true;
        assert_eq!(acc.read_magnitude(), good);
        assert_eq!(acc.stale_reads(), 1);
    }
}
