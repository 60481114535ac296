//! MCP3422 18-bit delta-sigma ADC: reads cell current and potential.
//!
//! Two transactions are used:
//!
//! - **configure**: address (write) + one configuration byte.
//! - **read**: address (read) + data bytes + the echoed configuration
//!   byte.  The 3-byte frame carries two data bytes (12/14/16-bit modes),
//!   the 4-byte frame three (18-bit mode).  Every byte but the last is
//!   ACKed; the last is NACKed so the ADC stops driving the bus before the
//!   stop condition.
//!
//! The firmware forwards raw frames to the host unchanged.  The
//! [`AdcConfig`] and [`decode_sample`] helpers describe the register layout
//! for logging and for host-side tests.
//!
//! ```text
//!  config byte:  RDY | C1 C0 | O/C | S1 S0 | G1 G0
//!                 7     6 5     4     3 2     1 0
//! ```

use log::debug;

use crate::app::ports::{Acknowledge, BusLink};
use crate::config::AdcBusConfig;

/// 8-bit write address (7-bit `0x68`, R/W = 0).
pub const WRITE_ADDRESS: u8 = 0xD0;
/// 8-bit read address (7-bit `0x68`, R/W = 1).
pub const READ_ADDRESS: u8 = 0xD1;

#[derive(Debug, Clone, Copy)]
pub struct Mcp3422 {
    write_address: u8,
    read_address: u8,
}

impl Mcp3422 {
    pub fn new(config: &AdcBusConfig) -> Self {
        Self {
            write_address: config.write_address,
            read_address: config.read_address,
        }
    }

    /// Write the configuration register.
    pub fn configure(&self, link: &mut impl BusLink, config: u8) {
        debug!("mcp3422: configure 0x{:02X} ({:?})", config, AdcConfig::from_byte(config));
        link.start();
        link.write_byte(self.write_address);
        link.write_byte(config);
        link.stop();
    }

    /// Read two data bytes and the configuration byte.
    pub fn read3(&self, link: &mut impl BusLink) -> [u8; 3] {
        self.read_frame(link)
    }

    /// Read three data bytes and the configuration byte.
    pub fn read4(&self, link: &mut impl BusLink) -> [u8; 4] {
        self.read_frame(link)
    }

    fn read_frame<const N: usize>(&self, link: &mut impl BusLink) -> [u8; N] {
        let mut frame = [0u8; N];
        link.start();
        link.write_byte(self.read_address);
        for (i, byte) in frame.iter_mut().enumerate() {
            let ack = if i + 1 == N {
                Acknowledge::Nack
            } else {
                Acknowledge::Ack
            };
            *byte = link.read_byte(ack);
        }
        link.stop();
        debug!("mcp3422: read {:02X?}", frame);
        frame
    }
}

impl Default for Mcp3422 {
    fn default() -> Self {
        Self::new(&AdcBusConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Configuration register
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ch1,
    Ch2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    OneShot,
    Continuous,
}

/// Sample rate / resolution selection (S1:S0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 240 SPS
    Bits12,
    /// 60 SPS
    Bits14,
    /// 15 SPS
    Bits16,
    /// 3.75 SPS
    Bits18,
}

/// Which read transaction returns a full sample at a given resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadVariant {
    /// `ADCREAD3`: two data bytes + config.
    Read3,
    /// `ADCREAD4`: three data bytes + config.
    Read4,
}

impl Resolution {
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits12 => 12,
            Self::Bits14 => 14,
            Self::Bits16 => 16,
            Self::Bits18 => 18,
        }
    }

    /// Data bytes preceding the configuration byte in a read frame.
    pub const fn data_bytes(self) -> usize {
        match self {
            Self::Bits18 => 3,
            _ => 2,
        }
    }

    pub const fn read_variant(self) -> ReadVariant {
        match self.data_bytes() {
            3 => ReadVariant::Read4,
            _ => ReadVariant::Read3,
        }
    }

    const fn code(self) -> u8 {
        match self {
            Self::Bits12 => 0b00,
            Self::Bits14 => 0b01,
            Self::Bits16 => 0b10,
            Self::Bits18 => 0b11,
        }
    }

    const fn from_code(code: u8) -> Self {
        match code & 0b11 {
            0b00 => Self::Bits12,
            0b01 => Self::Bits14,
            0b10 => Self::Bits16,
            _ => Self::Bits18,
        }
    }
}

/// PGA gain (G1:G0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gain {
    X1,
    X2,
    X4,
    X8,
}

impl Gain {
    pub const fn factor(self) -> u8 {
        1 << (self as u8)
    }
}

/// Decoded MCP3422 configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcConfig {
    /// RDY bit.  Writing 1 in one-shot mode starts a conversion; reading 0
    /// means the data bytes hold a fresh result.
    pub ready_or_start: bool,
    pub channel: Channel,
    pub mode: ConversionMode,
    pub resolution: Resolution,
    pub gain: Gain,
}

impl AdcConfig {
    /// Power-on default of the device: channel 1, continuous, 12-bit, x1.
    pub const POWER_ON: Self = Self {
        ready_or_start: true,
        channel: Channel::Ch1,
        mode: ConversionMode::Continuous,
        resolution: Resolution::Bits12,
        gain: Gain::X1,
    };

    pub const fn to_byte(self) -> u8 {
        let rdy = if self.ready_or_start { 0x80 } else { 0x00 };
        let ch = match self.channel {
            Channel::Ch1 => 0b00,
            Channel::Ch2 => 0b01,
        };
        let oc = match self.mode {
            ConversionMode::OneShot => 0x00,
            ConversionMode::Continuous => 0x10,
        };
        rdy | (ch << 5) | oc | (self.resolution.code() << 2) | (self.gain as u8)
    }

    /// Decode any byte.  Channel codes 3 and 4 do not exist on the MCP3422
    /// (they select channels on the MCP3424) and decode as channel 2.
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            ready_or_start: byte & 0x80 != 0,
            channel: if (byte >> 5) & 0b11 == 0 {
                Channel::Ch1
            } else {
                Channel::Ch2
            },
            mode: if byte & 0x10 != 0 {
                ConversionMode::Continuous
            } else {
                ConversionMode::OneShot
            },
            resolution: Resolution::from_code(byte >> 2),
            gain: match byte & 0b11 {
                0b00 => Gain::X1,
                0b01 => Gain::X2,
                0b10 => Gain::X4,
                _ => Gain::X8,
            },
        }
    }
}

/// Convert the data bytes of a read frame into a signed output code.
///
/// `data` is big-endian; only the last [`Resolution::data_bytes`] bytes
/// of it are used, so a full frame minus its config byte can be passed
/// directly.  Returns `None` if `data` is too short.
pub fn decode_sample(resolution: Resolution, data: &[u8]) -> Option<i32> {
    let n = resolution.data_bytes();
    let bytes = data.get(data.len().checked_sub(n)?..)?;
    let raw = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
    let shift = 32 - resolution.bits();
    Some(((raw << shift) as i32) >> shift)
}
