//! MAX5217 16-bit DAC: sets the electrode bias (potentiostatic) or the
//! cell current setpoint (galvanostatic).
//!
//! Only the CODE_LOAD command is used: it writes the input register and
//! updates the output in one transaction.  The transaction has no read
//! phase and is idempotent; repeating it re-asserts the same code.

use log::debug;

use crate::app::ports::BusLink;
use crate::config::DacConfig;

/// 8-bit write address (7-bit `0x1D`, R/W = 0).
pub const WRITE_ADDRESS: u8 = 0x3A;
/// CODE_LOAD: load the input register and update the DAC output.
pub const CMD_CODE_LOAD: u8 = 0x01;

#[derive(Debug, Clone, Copy)]
pub struct Max5217 {
    write_address: u8,
    code_load: u8,
}

impl Max5217 {
    pub fn new(config: &DacConfig) -> Self {
        Self {
            write_address: config.write_address,
            code_load: config.code_load_command,
        }
    }

    /// Load the 16-bit code `hi:lo` into the DAC output.
    pub fn load_code(&self, link: &mut impl BusLink, hi: u8, lo: u8) {
        debug!("max5217: code load 0x{:02X}{:02X}", hi, lo);
        link.start();
        link.write_byte(self.write_address);
        link.write_byte(self.code_load);
        link.write_byte(hi);
        link.write_byte(lo);
        link.stop();
    }

    /// Convenience wrapper over [`load_code`](Self::load_code) for a whole code word.
    pub fn set_output(&self, link: &mut impl BusLink, code: u16) {
        let [hi, lo] = code.to_be_bytes();
        self.load_code(link, hi, lo);
    }
}

impl Default for Max5217 {
    fn default() -> Self {
        Self::new(&DacConfig::default())
    }
}
