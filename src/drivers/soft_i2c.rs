//! Bit-banged I2C master over two open-drain lines.
//!
//! Timing is a fixed half-bit delay `D` between line transitions, supplied
//! by an injected [`DelayNs`].  There is no clock-stretch detection and no
//! bus-busy detection: the link assumes it is the only master and that
//! slaves keep up with `D`.
//!
//! ```text
//!        start         bit 7 .. bit 0            ack slot       stop
//! SCL  ‾‾‾‾‾‾‾\__/‾‾‾\__/‾‾‾\ ... __/‾‾‾\__/‾‾‾‾‾\__________/‾‾‾‾‾‾‾‾
//! SDA  ‾‾‾\_______X=======X== ... ==X=====X______/‾‾‾‾‾‾‾‾‾‾
//!          │ D │  D  │  D  │             │  D  │  D  │  D  │  D  │
//! ```
//!
//! # No timeouts
//!
//! Nothing here can fail or hang on a misbehaving slave.  A read from an
//! absent device completes normally and returns the pulled-up level
//! (`0xFF`); a write that nobody acknowledges is indistinguishable from
//! one that was.  The acknowledge bit after a write is clocked but never
//! sampled.  Callers that need to detect a missing device must do so at a
//! higher level (e.g. by checking the ADC's echoed configuration byte).

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::app::ports::{Acknowledge, BusLink};

use super::line::Line;

/// Clock pulses issued by [`SoftI2c::recover`] before giving up.
/// Nine covers a slave stuck anywhere inside a byte plus its ACK slot.
pub const RECOVERY_PULSES: u8 = 9;

/// Bit-banged I2C master.
pub struct SoftI2c<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    /// Half-bit delay `D` in nanoseconds.
    half_bit_ns: u32,
}

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: Line,
    SDA: Line,
    D: DelayNs,
{
    pub fn new(scl: SCL, sda: SDA, delay: D, half_bit_ns: u32) -> Self {
        Self {
            scl,
            sda,
            delay,
            half_bit_ns,
        }
    }

    /// The configured half-bit delay in nanoseconds.
    pub fn half_bit_ns(&self) -> u32 {
        self.half_bit_ns
    }

    /// Give the lines and the delay provider back.
    pub fn into_parts(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    #[inline]
    fn settle(&mut self) {
        self.delay.delay_ns(self.half_bit_ns);
    }

    /// One clock pulse: low for `D`, released for `D`.
    #[inline]
    fn clock_pulse(&mut self) {
        self.scl.drive_low();
        self.settle();
        self.scl.release();
        self.settle();
    }
}

impl<SCL, SDA, D> BusLink for SoftI2c<SCL, SDA, D>
where
    SCL: Line,
    SDA: Line,
    D: DelayNs,
{
    fn start(&mut self) {
        self.scl.release();
        self.sda.drive_low();
        self.settle();
    }

    fn stop(&mut self) {
        self.scl.drive_low();
        self.sda.drive_low();
        self.settle();
        self.scl.release();
        self.settle();
        self.sda.release();
        self.settle();
    }

    fn write_byte(&mut self, byte: u8) {
        let mut shift = byte;
        for _ in 0..8 {
            self.scl.drive_low();
            if shift & 0x80 != 0 {
                self.sda.release();
            } else {
                self.sda.drive_low();
            }
            self.settle();
            self.scl.release();
            self.settle();
            shift <<= 1;
        }
        // ACK slot: data stays at the last bit's level, the slave's answer
        // is not looked at.
        self.clock_pulse();
    }

    fn read_byte(&mut self, ack: Acknowledge) -> u8 {
        self.scl.drive_low();
        self.sda.release();

        let mut byte = 0u8;
        for _ in 0..8 {
            self.clock_pulse();
            byte = (byte << 1) | u8::from(self.sda.is_high());
        }

        self.scl.drive_low();
        if ack == Acknowledge::Ack {
            self.sda.drive_low();
        }
        self.settle();
        self.scl.release();
        self.settle();

        byte
    }

    fn recover(&mut self) -> bool {
        self.sda.release();
        let mut pulses = 0;
        while pulses < RECOVERY_PULSES && !self.sda.is_high() {
            self.clock_pulse();
            pulses += 1;
        }
        let freed = self.sda.is_high();
        self.stop();

        if freed {
            debug!("soft_i2c: bus idle after {} recovery pulses", pulses);
        } else {
            warn!(
                "soft_i2c: data line still held low after {} recovery pulses",
                RECOVERY_PULSES
            );
        }
        freed
    }
}
