//! Fuzz target: raw `BusLink` operation sequences on the simulated bus
//!
//! Interprets the input as a script of start/stop/write/read operations
//! and checks that the link never panics and that a final stop always
//! releases the clock.
//!
//! cargo fuzz run fuzz_sim_bus

#![no_main]

use libfuzzer_sys::fuzz_target;
use potentiostat::app::ports::{Acknowledge, BusLink};
use potentiostat::drivers::line::LineState;
use potentiostat::drivers::sim_bus::{CountingDelay, Peripheral, SimBus, Wire};
use potentiostat::drivers::soft_i2c::SoftI2c;

fuzz_target!(|data: &[u8]| {
    let Some((&kind, script)) = data.split_first() else {
        return;
    };
    let peripheral = match kind % 4 {
        0 => Peripheral::Absent,
        1 => Peripheral::Device { address: 0x68 },
        2 => Peripheral::Loopback,
        _ => Peripheral::Stuck { pulses: u32::from(kind >> 2) },
    };
    let bus = SimBus::new(peripheral);
    let (scl, sda) = bus.lines();
    let mut link = SoftI2c::new(scl, sda, CountingDelay::new(), 1);

    let mut ops = script.iter();
    while let Some(&op) = ops.next() {
        match op % 5 {
            0 => link.start(),
            1 => link.stop(),
            2 => link.write_byte(ops.next().copied().unwrap_or(op)),
            3 => {
                let _ = link.read_byte(Acknowledge::Ack);
            }
            _ => {
                let _ = link.read_byte(Acknowledge::Nack);
            }
        }
    }
    link.stop();
    // A slave may still hold data low mid-byte; the clock is ours alone.
    assert_eq!(bus.level(Wire::Clock), LineState::Released);
});
