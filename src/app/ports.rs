//! Port traits: the boundary between the dispatcher and the hardware.
//!
//! ```text
//!   Host ──▶ Instrument (dispatch) ──▶ BusLink      ──▶ DAC / ADC
//!                                  ──▶ FrontEndPort ──▶ relay pins
//!                                  ──▶ EventSink    ──▶ log
//! ```
//!
//! Drivers implement these traits.  The [`Instrument`](super::service::Instrument)
//! and the device transactions consume them via generics.

use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────
// Bus link port (device transactions → two-wire bus)
// ───────────────────────────────────────────────────────────────

/// How a received byte is terminated by the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledge {
    /// Pull data low during the ninth clock: the slave keeps transmitting.
    Ack,
    /// Leave data released during the ninth clock: the slave stops
    /// driving the bus.
    Nack,
}

/// Byte-level I2C master operations.
///
/// Every call blocks until the bits are clocked out.  There is no failure
/// reporting at this level: an absent or unresponsive slave simply reads
/// as the pulled-up idle level and a missing write ACK goes unnoticed.
/// Implementations must not be invoked re-entrantly.
pub trait BusLink {
    /// Start condition: data falls while clock is high.
    fn start(&mut self);

    /// Stop condition: data rises while clock is high.  Leaves both lines
    /// released.
    fn stop(&mut self);

    /// Clock out one byte MSB first and pulse the acknowledge slot without
    /// sampling it.
    fn write_byte(&mut self, byte: u8);

    /// Clock in one byte MSB first, then terminate it with `ack`.
    fn read_byte(&mut self, ack: Acknowledge) -> u8;

    /// Try to free a bus held by a slave stuck mid-byte.
    ///
    /// Returns `true` if the data line is released afterwards.  Links with
    /// no notion of a stuck bus report success.
    fn recover(&mut self) -> bool {
        true
    }
}

// ───────────────────────────────────────────────────────────────
// Front-end port (dispatcher → analog front-end relay pins)
// ───────────────────────────────────────────────────────────────

/// Cell connection relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    On,
    Off,
}

/// Control mode of the analog loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Cell potential is controlled (mode pin low).
    Potentiostatic,
    /// Cell current is controlled (mode pin high).
    Galvanostatic,
}

/// Current range selection.  Exactly one range pin is high at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Range {
    R1,
    R2,
    R3,
    R4,
}

impl Range {
    pub const ALL: [Range; 4] = [Range::R1, Range::R2, Range::R3, Range::R4];

    /// Zero-based index of the range-select pin driven high.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Port latch image on the reference board (RC2..RC5).
    pub const fn latch_mask(self) -> u8 {
        0x04 << self.index()
    }
}

/// Write-side port: the dispatcher calls this to reconfigure the front end.
pub trait FrontEndPort {
    fn set_cell(&mut self, state: CellState);

    fn set_mode(&mut self, mode: Mode);

    /// Drive the range-select pins one-hot for `range`.
    fn set_range(&mut self, range: Range);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The instrument emits structured [`InstrumentEvent`](super::events::InstrumentEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::InstrumentEvent);
}
