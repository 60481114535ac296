//! Host-side simulation of the two-wire bus.
//!
//! Stands in for the physical SCL/SDA pair so the bit-banged link can be
//! driven exactly as on the board.  Both lines are wired-AND: a line reads
//! high only if neither the master nor the simulated slave pulls it low.
//! The slave reacts to real edges (start/stop detection while SCL is high,
//! sampling on SCL rising, changing its output on SCL falling), so a
//! protocol mistake in the master shows up as wrong data, not as a
//! mismatched call log.
//!
//! Only compiled for host targets.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use super::line::{Line, LineState};

/// Which wire of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    Clock,
    Data,
}

/// What happened on the bus, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// The master changed the state it imposes on a line.
    Drive(Wire, LineState),
    /// The master sampled the data line.
    Sample(bool),
    /// Data fell while clock was high.
    Start,
    /// Data rose while clock was high.
    Stop,
}

/// The device attached to the simulated bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peripheral {
    /// Nothing answers; every read returns the pull-up level.
    Absent,
    /// A slave at 7-bit `address` that ACKs its address and every written
    /// byte, records what it receives, and transmits queued bytes on reads
    /// (`0xFF` once the queue is empty).
    Device { address: u8 },
    /// Captures the first byte clocked into it and clocks it back out on
    /// the next eight bit slots after the ACK slot.  Ignores start/stop.
    Loopback,
    /// Holds data low until it has seen `pulses` rising clock edges.
    Stuck { pulses: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlaveState {
    Idle,
    Address { shift: u8, bits: u8 },
    /// Pulling data low for the ACK slot.  Released on the next falling
    /// clock edge, after which the slave either transmits or receives.
    AckOut { transmit: bool },
    Receive { shift: u8, bits: u8 },
    Transmit { byte: u8, bit: u8 },
    /// Waiting for the master's ACK/NACK after a transmitted byte.
    AckIn { acked: bool },
    /// Not addressed, or done: stay off the bus until the next start.
    Ignore,
    Capture { shift: u8, bits: u8 },
    SkipAck { byte: u8 },
    Replay { byte: u8, bit: u8 },
    Stuck { remaining: u32 },
}

struct BusState {
    peripheral: Peripheral,
    slave: SlaveState,
    master_scl_low: bool,
    master_sda_low: bool,
    slave_sda_low: bool,
    responses: VecDeque<u8>,
    frames: Vec<Vec<u8>>,
    events: Vec<BusEvent>,
    rising_edges: u32,
    starts: u32,
    stops: u32,
}

impl BusState {
    fn new(peripheral: Peripheral) -> Self {
        let (slave, slave_sda_low) = match peripheral {
            Peripheral::Loopback => (SlaveState::Capture { shift: 0, bits: 0 }, false),
            Peripheral::Stuck { pulses } if pulses > 0 => {
                (SlaveState::Stuck { remaining: pulses }, true)
            }
            _ => (SlaveState::Idle, false),
        };
        Self {
            peripheral,
            slave,
            master_scl_low: false,
            master_sda_low: false,
            slave_sda_low,
            responses: VecDeque::new(),
            frames: Vec::new(),
            events: Vec::new(),
            rising_edges: 0,
            starts: 0,
            stops: 0,
        }
    }

    fn scl_high(&self) -> bool {
        !self.master_scl_low
    }

    fn sda_high(&self) -> bool {
        !self.master_sda_low && !self.slave_sda_low
    }

    fn set_master(&mut self, wire: Wire, low: bool) {
        self.events.push(BusEvent::Drive(
            wire,
            if low { LineState::DrivenLow } else { LineState::Released },
        ));

        match wire {
            Wire::Clock => {
                let was_high = self.scl_high();
                self.master_scl_low = low;
                match (was_high, self.scl_high()) {
                    (false, true) => self.on_clock_rise(),
                    (true, false) => self.on_clock_fall(),
                    _ => {}
                }
            }
            Wire::Data => {
                let was_high = self.sda_high();
                self.master_sda_low = low;
                if self.scl_high() {
                    match (was_high, self.sda_high()) {
                        (true, false) => self.on_start(),
                        (false, true) => self.on_stop(),
                        _ => {}
                    }
                }
            }
        }
    }

    fn on_start(&mut self) {
        self.events.push(BusEvent::Start);
        self.starts += 1;
        if let Peripheral::Device { .. } = self.peripheral {
            self.slave = SlaveState::Address { shift: 0, bits: 0 };
            self.slave_sda_low = false;
            self.frames.push(Vec::new());
        }
    }

    fn on_stop(&mut self) {
        self.events.push(BusEvent::Stop);
        self.stops += 1;
        if let Peripheral::Device { .. } = self.peripheral {
            self.slave = SlaveState::Idle;
            self.slave_sda_low = false;
        }
    }

    fn on_clock_rise(&mut self) {
        self.rising_edges += 1;
        let bit = u8::from(self.sda_high());
        self.slave = match self.slave {
            SlaveState::Address { shift, bits } => SlaveState::Address {
                shift: (shift << 1) | bit,
                bits: bits + 1,
            },
            SlaveState::Receive { shift, bits } => SlaveState::Receive {
                shift: (shift << 1) | bit,
                bits: bits + 1,
            },
            SlaveState::Capture { shift, bits } if bits < 8 => SlaveState::Capture {
                shift: (shift << 1) | bit,
                bits: bits + 1,
            },
            SlaveState::AckIn { .. } => SlaveState::AckIn { acked: bit == 0 },
            SlaveState::Stuck { remaining } => {
                if remaining <= 1 {
                    self.slave_sda_low = false;
                    SlaveState::Ignore
                } else {
                    SlaveState::Stuck {
                        remaining: remaining - 1,
                    }
                }
            }
            other => other,
        };
    }

    fn on_clock_fall(&mut self) {
        self.slave = match self.slave {
            SlaveState::Address { shift, bits: 8 } => {
                let addressed = matches!(
                    self.peripheral,
                    Peripheral::Device { address } if address == shift >> 1
                );
                if addressed {
                    self.push_received(shift);
                    self.slave_sda_low = true;
                    SlaveState::AckOut {
                        transmit: shift & 1 == 1,
                    }
                } else {
                    SlaveState::Ignore
                }
            }
            SlaveState::Receive { shift, bits: 8 } => {
                self.push_received(shift);
                self.slave_sda_low = true;
                SlaveState::AckOut { transmit: false }
            }
            SlaveState::AckOut { transmit: false } => {
                self.slave_sda_low = false;
                SlaveState::Receive { shift: 0, bits: 0 }
            }
            SlaveState::AckOut { transmit: true } | SlaveState::AckIn { acked: true } => {
                let byte = self.responses.pop_front().unwrap_or(0xFF);
                self.present(byte, 0);
                SlaveState::Transmit { byte, bit: 0 }
            }
            SlaveState::AckIn { acked: false } => {
                self.slave_sda_low = false;
                SlaveState::Ignore
            }
            SlaveState::Transmit { byte, bit } => {
                if bit + 1 == 8 {
                    self.slave_sda_low = false;
                    SlaveState::AckIn { acked: false }
                } else {
                    self.present(byte, bit + 1);
                    SlaveState::Transmit { byte, bit: bit + 1 }
                }
            }
            SlaveState::Capture { shift, bits: 8 } => SlaveState::SkipAck { byte: shift },
            SlaveState::SkipAck { byte } => {
                self.present(byte, 0);
                SlaveState::Replay { byte, bit: 0 }
            }
            SlaveState::Replay { byte, bit } => {
                if bit + 1 == 8 {
                    self.slave_sda_low = false;
                    SlaveState::Ignore
                } else {
                    self.present(byte, bit + 1);
                    SlaveState::Replay { byte, bit: bit + 1 }
                }
            }
            other => other,
        };
    }

    /// Drive data for bit `bit` of `byte` (0 = MSB).
    fn present(&mut self, byte: u8, bit: u8) {
        self.slave_sda_low = (byte << bit) & 0x80 == 0;
    }

    fn push_received(&mut self, byte: u8) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(byte);
        }
    }
}

/// Shared handle to a simulated bus.
#[derive(Clone)]
pub struct SimBus {
    state: Rc<RefCell<BusState>>,
}

impl SimBus {
    pub fn new(peripheral: Peripheral) -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState::new(peripheral))),
        }
    }

    /// Master-side handles for (clock, data).  May be called repeatedly;
    /// every handle acts on the same bus.
    pub fn lines(&self) -> (SimLine, SimLine) {
        (
            SimLine {
                wire: Wire::Clock,
                state: Rc::clone(&self.state),
            },
            SimLine {
                wire: Wire::Data,
                state: Rc::clone(&self.state),
            },
        )
    }

    /// Queue bytes the device will transmit on subsequent reads.
    pub fn queue_response(&self, bytes: &[u8]) {
        self.state.borrow_mut().responses.extend(bytes.iter().copied());
    }

    /// Bytes the device received, one frame per start condition.  The
    /// first byte of each frame is the address byte.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.state.borrow().frames.clone()
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    /// Wired level of a line.
    pub fn level(&self, wire: Wire) -> LineState {
        let state = self.state.borrow();
        let high = match wire {
            Wire::Clock => state.scl_high(),
            Wire::Data => state.sda_high(),
        };
        if high { LineState::Released } else { LineState::DrivenLow }
    }

    /// Both lines released.
    pub fn is_idle(&self) -> bool {
        let state = self.state.borrow();
        state.scl_high() && state.sda_high()
    }

    pub fn rising_edges(&self) -> u32 {
        self.state.borrow().rising_edges
    }

    pub fn starts(&self) -> u32 {
        self.state.borrow().starts
    }

    pub fn stops(&self) -> u32 {
        self.state.borrow().stops
    }
}

/// One master-side line of a [`SimBus`].
pub struct SimLine {
    wire: Wire,
    state: Rc<RefCell<BusState>>,
}

impl Line for SimLine {
    fn release(&mut self) {
        self.state.borrow_mut().set_master(self.wire, false);
    }

    fn drive_low(&mut self) {
        self.state.borrow_mut().set_master(self.wire, true);
    }

    fn is_high(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        let high = match self.wire {
            Wire::Clock => state.scl_high(),
            Wire::Data => state.sda_high(),
        };
        if self.wire == Wire::Data {
            state.events.push(BusEvent::Sample(high));
        }
        high
    }
}

/// [`DelayNs`] that returns immediately and accounts the requested time.
#[derive(Debug, Default)]
pub struct CountingDelay {
    calls: u32,
    total_ns: u64,
}

impl CountingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}
