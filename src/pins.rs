//! GPIO assignments for the potentiostat control board.
//!
//! Single source of truth: `main.rs` builds every pin driver from these
//! numbers.

// ---------------------------------------------------------------------------
// Two-wire bus to the DAC and ADC (open drain, external 4.7 kΩ pull-ups)
// ---------------------------------------------------------------------------

pub const I2C_SCL_GPIO: i32 = 15;
pub const I2C_SDA_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Analog front end
// ---------------------------------------------------------------------------

/// Cell relay: HIGH = counter and working electrodes connected.
pub const CELL_ENABLE_GPIO: i32 = 4;
/// Control loop switch: LOW = potentiostatic, HIGH = galvanostatic.
pub const MODE_GPIO: i32 = 5;
/// Current range select, one-hot.  Index 0 is range 1.
pub const RANGE_GPIOS: [i32; 4] = [6, 7, 8, 9];

// ---------------------------------------------------------------------------
// Host link
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
pub const UART_BAUD: u32 = 115_200;
