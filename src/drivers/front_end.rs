//! Analog front-end relay/switch driver.
//!
//! Three groups of push-pull outputs:
//!
//! - cell enable (high = counter/working electrodes connected),
//! - mode switch (low = potentiostatic, high = galvanostatic),
//! - four range-select lines, driven one-hot.
//!
//! The driver is a dumb actuator; it does not validate transitions (e.g.
//! switching range with the cell connected is allowed, as on the reference
//! board).

use embedded_hal::digital::{OutputPin, PinState};
use log::{info, warn};

use crate::app::ports::{CellState, FrontEndPort, Mode, Range};

pub struct FrontEnd<CELL, MODE, RANGE> {
    cell_pin: CELL,
    mode_pin: MODE,
    range_pins: [RANGE; 4],
}

impl<CELL, MODE, RANGE> FrontEnd<CELL, MODE, RANGE>
where
    CELL: OutputPin,
    MODE: OutputPin,
    RANGE: OutputPin,
{
    /// Take ownership of the pins.  No level is written until the first
    /// `set_*` call; the instrument applies the power-on state at start.
    pub fn new(cell_pin: CELL, mode_pin: MODE, range_pins: [RANGE; 4]) -> Self {
        Self {
            cell_pin,
            mode_pin,
            range_pins,
        }
    }

    pub fn into_parts(self) -> (CELL, MODE, [RANGE; 4]) {
        (self.cell_pin, self.mode_pin, self.range_pins)
    }
}

fn write_pin<P: OutputPin>(name: &str, pin: &mut P, state: PinState) {
    if let Err(e) = pin.set_state(state) {
        warn!("front_end: {} write failed: {:?}", name, e);
    }
}

impl<CELL, MODE, RANGE> FrontEndPort for FrontEnd<CELL, MODE, RANGE>
where
    CELL: OutputPin,
    MODE: OutputPin,
    RANGE: OutputPin,
{
    fn set_cell(&mut self, state: CellState) {
        write_pin("cell", &mut self.cell_pin, PinState::from(state == CellState::On));
        info!("front_end: cell {:?}", state);
    }

    fn set_mode(&mut self, mode: Mode) {
        write_pin(
            "mode",
            &mut self.mode_pin,
            PinState::from(mode == Mode::Galvanostatic),
        );
        info!("front_end: mode {:?}", mode);
    }

    fn set_range(&mut self, range: Range) {
        // Lower the others first so two ranges are never selected together.
        for (i, pin) in self.range_pins.iter_mut().enumerate() {
            if i != range.index() {
                write_pin("range", pin, PinState::Low);
            }
        }
        write_pin("range", &mut self.range_pins[range.index()], PinState::High);
        info!("front_end: range {:?}", range);
    }
}
