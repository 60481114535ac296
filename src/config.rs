//! System configuration parameters
//!
//! Bus timing, device addresses and the power-on front-end state.
//! Defaults reproduce the reference board exactly; pin numbers are
//! compile-time constants in [`crate::pins`].

use serde::{Deserialize, Serialize};

use crate::app::ports::{CellState, Mode, Range};
use crate::drivers::{max5217, mcp3422};
use crate::error::ConfigError;

/// Upper bound on the half-bit delay: anything slower than 500 Hz is a
/// typo, not a tuning choice.
pub const MAX_BIT_DELAY_NS: u32 = 1_000_000;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Half-bit delay `D` of the bit-banged bus, in nanoseconds.
    /// 5 µs gives a nominal 100 kHz clock; tune to the target's GPIO
    /// latency.
    pub bit_delay_ns: u32,
    pub dac: DacConfig,
    pub adc: AdcBusConfig,
    /// Front-end state applied at startup.
    pub power_on: FrontEndState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DacConfig {
    pub write_address: u8,
    pub code_load_command: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdcBusConfig {
    pub write_address: u8,
    pub read_address: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontEndState {
    pub cell: CellState,
    pub mode: Mode,
    pub range: Range,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            bit_delay_ns: 5_000,
            dac: DacConfig::default(),
            adc: AdcBusConfig::default(),
            power_on: FrontEndState::default(),
        }
    }
}

impl Default for DacConfig {
    fn default() -> Self {
        Self {
            write_address: max5217::WRITE_ADDRESS,
            code_load_command: max5217::CMD_CODE_LOAD,
        }
    }
}

impl Default for AdcBusConfig {
    fn default() -> Self {
        Self {
            write_address: mcp3422::WRITE_ADDRESS,
            read_address: mcp3422::READ_ADDRESS,
        }
    }
}

impl Default for FrontEndState {
    /// Cell disconnected, potentiostatic, least sensitive range.
    fn default() -> Self {
        Self {
            cell: CellState::Off,
            mode: Mode::Potentiostatic,
            range: Range::R1,
        }
    }
}

impl SystemConfig {
    /// Reject values that would put a broken transaction on the bus.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bit_delay_ns == 0 {
            return Err(ConfigError::ValidationFailed("bit_delay_ns must be > 0"));
        }
        if self.bit_delay_ns > MAX_BIT_DELAY_NS {
            return Err(ConfigError::ValidationFailed("bit_delay_ns must be <= 1 ms"));
        }
        if self.dac.write_address & 1 != 0 {
            return Err(ConfigError::ValidationFailed("dac.write_address must have R/W = 0"));
        }
        if self.adc.write_address & 1 != 0 {
            return Err(ConfigError::ValidationFailed("adc.write_address must have R/W = 0"));
        }
        if self.adc.read_address != self.adc.write_address | 1 {
            return Err(ConfigError::ValidationFailed(
                "adc.read_address must be adc.write_address | 1",
            ));
        }
        Ok(())
    }

    /// Nominal SCL frequency implied by `bit_delay_ns`, ignoring GPIO latency.
    pub fn nominal_clock_hz(&self) -> u32 {
        1_000_000_000 / (2 * self.bit_delay_ns.max(1))
    }
}
