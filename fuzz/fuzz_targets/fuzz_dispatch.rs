//! Fuzz target: `Instrument::handle`
//!
//! Feeds arbitrary packets through classification and execution against
//! the simulated bus and asserts that every reply is one of the three
//! legal shapes and that the bus is released afterwards.
//!
//! cargo fuzz run fuzz_dispatch

#![no_main]

use libfuzzer_sys::fuzz_target;
use potentiostat::app::events::InstrumentEvent;
use potentiostat::app::ports::{CellState, EventSink, FrontEndPort, Mode, Range};
use potentiostat::app::service::Instrument;
use potentiostat::config::SystemConfig;
use potentiostat::drivers::sim_bus::{CountingDelay, Peripheral, SimBus};
use potentiostat::drivers::soft_i2c::SoftI2c;
use potentiostat::transport::MAX_PACKET_SIZE;

struct NoPins;

impl FrontEndPort for NoPins {
    fn set_cell(&mut self, _: CellState) {}
    fn set_mode(&mut self, _: Mode) {}
    fn set_range(&mut self, _: Range) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _: &InstrumentEvent) {}
}

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_PACKET_SIZE {
        return;
    }
    let bus = SimBus::new(Peripheral::Device { address: 0x68 });
    let (scl, sda) = bus.lines();
    let link = SoftI2c::new(scl, sda, CountingDelay::new(), 5_000);
    let mut inst = Instrument::new(&SystemConfig::default(), link, NoPins);

    let reply = inst.handle(data, &mut Discard);
    let bytes = reply.as_bytes();
    assert!(
        bytes == b"OK" || bytes == b"?" || bytes.len() == 3 || bytes.len() == 4,
        "unexpected reply shape: {:?}",
        bytes
    );
    assert!(bus.is_idle(), "bus left held after {:?}", data);
});
