//! Open-drain bus line abstraction.
//!
//! A bus line has exactly two states: driven low, or released and pulled
//! high by the external resistor.  A line is never actively driven high,
//! so two devices fighting over it can only ever produce a wired-AND.
//!
//! [`OpenDrainLine`] maps any embedded-hal pin configured as open-drain
//! output with input buffer onto this model.  On the ESP32-S3 the pad is
//! put in `InputOutputOd` mode.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

/// Electrical state the master imposes on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    DrivenLow,
    Released,
}

/// One wire of the two-wire bus as seen by the master.
pub trait Line {
    /// Stop driving; the pull-up takes the line high unless a slave holds it.
    fn release(&mut self);

    /// Sink the line to ground.
    fn drive_low(&mut self);

    /// Sample the actual line level (wired-AND of every device).
    fn is_high(&mut self) -> bool;

    /// Apply a [`LineState`].
    fn set(&mut self, state: LineState) {
        match state {
            LineState::DrivenLow => self.drive_low(),
            LineState::Released => self.release(),
        }
    }
}

/// Adapter from an open-drain embedded-hal pin to [`Line`].
///
/// Pin errors are logged and otherwise ignored: the bus layer has no
/// failure channel.  A failed read reports the released (high) level,
/// which is what an idle bus reads anyway.
pub struct OpenDrainLine<P> {
    name: &'static str,
    pin: P,
}

impl<P> OpenDrainLine<P>
where
    P: OutputPin + InputPin,
{
    /// Wrap `pin` and release it so the bus starts idle.
    pub fn new(name: &'static str, mut pin: P) -> Self {
        if let Err(e) = pin.set_high() {
            warn!("{}: initial release failed: {:?}", name, e);
        }
        Self { name, pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> Line for OpenDrainLine<P>
where
    P: OutputPin + InputPin,
{
    fn release(&mut self) {
        if let Err(e) = self.pin.set_high() {
            warn!("{}: release failed: {:?}", self.name, e);
        }
    }

    fn drive_low(&mut self) {
        if let Err(e) = self.pin.set_low() {
            warn!("{}: drive low failed: {:?}", self.name, e);
        }
    }

    fn is_high(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => level,
            Err(e) => {
                warn!("{}: sample failed: {:?}", self.name, e);
                true
            }
        }
    }
}
