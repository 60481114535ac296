//! End-to-end tests: Instrument → SoftI2c → simulated wired-AND bus.
//!
//! Unlike the dispatcher tests these go through the real bit-banged link,
//! so addressing, bit order and ACK/NACK placement are checked by a slave
//! that reacts to clock and data edges.

use super::mock_hw::{LogSink, MockFrontEnd};

use potentiostat::app::ports::{Acknowledge, BusLink};
use potentiostat::app::service::Instrument;
use potentiostat::config::SystemConfig;
use potentiostat::drivers::max5217::Max5217;
use potentiostat::drivers::mcp3422::{AdcConfig, Mcp3422, Resolution, decode_sample};
use potentiostat::drivers::sim_bus::{BusEvent, CountingDelay, Peripheral, SimBus, SimLine};
use potentiostat::drivers::soft_i2c::SoftI2c;

type SimLink = SoftI2c<SimLine, SimLine, CountingDelay>;

const DAC_7BIT: u8 = 0x1D;
const ADC_7BIT: u8 = 0x68;

fn link_on(bus: &SimBus) -> SimLink {
    let (scl, sda) = bus.lines();
    SoftI2c::new(scl, sda, CountingDelay::new(), SystemConfig::default().bit_delay_ns)
}

fn instrument_on(bus: &SimBus) -> Instrument<SimLink, MockFrontEnd> {
    Instrument::new(&SystemConfig::default(), link_on(bus), MockFrontEnd::new())
}

#[test]
fn dacset_reaches_the_dac() {
    let bus = SimBus::new(Peripheral::Device { address: DAC_7BIT });
    let mut inst = instrument_on(&bus);
    let mut sink = LogSink::new();

    let reply = inst.handle(b"DACSET \x12\x34", &mut sink);
    assert_eq!(reply.as_bytes(), b"OK");
    assert_eq!(bus.frames(), vec![vec![0x3A, 0x01, 0x12, 0x34]]);
    assert_eq!(bus.starts(), 1);
    assert_eq!(bus.stops(), 1);
    assert!(bus.is_idle(), "bus must be released after the transaction");
}

#[test]
fn adcconf_then_read4_against_the_adc() {
    let bus = SimBus::new(Peripheral::Device { address: ADC_7BIT });
    let mut inst = instrument_on(&bus);
    let mut sink = LogSink::new();

    assert_eq!(inst.handle(b"ADCCONF \x9C", &mut sink).as_bytes(), b"OK");

    // 18-bit sample 0x01FF80, then the config register echo.
    bus.queue_response(&[0x01, 0xFF, 0x80, 0x9C]);
    let reply = inst.handle(b"ADCREAD4", &mut sink);
    assert_eq!(reply.as_bytes(), &[0x01, 0xFF, 0x80, 0x9C]);

    let frames = bus.frames();
    assert_eq!(frames[0], vec![0xD0, 0x9C]);
    assert_eq!(frames[1][0], 0xD1);
    assert!(bus.is_idle());

    let cfg = AdcConfig::from_byte(reply.as_bytes()[3]);
    assert_eq!(cfg.resolution, Resolution::Bits18);
    assert_eq!(decode_sample(cfg.resolution, &reply.as_bytes()[..3]), Some(0x01FF80));
}

#[test]
fn adcread3_reads_16_bit_sample() {
    let bus = SimBus::new(Peripheral::Device { address: ADC_7BIT });
    bus.queue_response(&[0xFF, 0xFE, 0x98]);
    let mut inst = instrument_on(&bus);

    let reply = inst.handle(b"ADCREAD3", &mut LogSink::new());
    assert_eq!(reply.as_bytes(), &[0xFF, 0xFE, 0x98]);

    let cfg = AdcConfig::from_byte(0x98);
    assert_eq!(cfg.resolution, Resolution::Bits16);
    assert_eq!(decode_sample(cfg.resolution, &reply.as_bytes()[..2]), Some(-2));
}

#[test]
fn dac_frame_is_ignored_by_the_adc() {
    let bus = SimBus::new(Peripheral::Device { address: ADC_7BIT });
    let mut link = link_on(&bus);

    Max5217::default().load_code(&mut link, 0xAB, 0xCD);
    assert!(bus.frames().iter().all(|f| f.len() <= 1), "ADC must not latch DAC data");
}

#[test]
fn read_with_no_device_returns_pull_up_level() {
    let bus = SimBus::new(Peripheral::Absent);
    let mut link = link_on(&bus);

    assert_eq!(Mcp3422::default().read4(&mut link), [0xFF; 4]);
    assert!(bus.is_idle());
}

#[test]
fn last_read_byte_is_nacked() {
    let bus = SimBus::new(Peripheral::Device { address: ADC_7BIT });
    bus.queue_response(&[0x01, 0x02, 0x03, 0x04]);
    let mut link = link_on(&bus);
    let adc = Mcp3422::default();

    assert_eq!(adc.read3(&mut link), [0x01, 0x02, 0x03]);
    // A NACKed device stops transmitting, so the fourth byte is still
    // queued for the next transaction.
    assert_eq!(adc.read3(&mut link), [0x04, 0xFF, 0xFF]);

    let samples = bus
        .events()
        .iter()
        .filter(|e| matches!(e, BusEvent::Sample(_)))
        .count();
    assert_eq!(samples, 2 * 3 * 8);
}

#[test]
fn acknowledged_read_keeps_the_device_talking() {
    let bus = SimBus::new(Peripheral::Device { address: ADC_7BIT });
    bus.queue_response(&[0x11, 0x22]);
    let mut link = link_on(&bus);

    link.start();
    link.write_byte(0xD1);
    assert_eq!(link.read_byte(Acknowledge::Ack), 0x11);
    assert_eq!(link.read_byte(Acknowledge::Nack), 0x22);
    link.stop();
    assert!(bus.is_idle());
}

#[test]
fn recovery_frees_a_stuck_bus() {
    let bus = SimBus::new(Peripheral::Stuck { pulses: 3 });
    let mut link = link_on(&bus);

    assert!(link.recover());
    assert!(bus.is_idle());
}

#[test]
fn bit_delay_accounts_for_every_half_bit() {
    let bus = SimBus::new(Peripheral::Device { address: DAC_7BIT });
    let mut link = link_on(&bus);

    Max5217::default().load_code(&mut link, 0x00, 0x00);
    let (_, _, delay) = link.into_parts();
    // start + 4 bytes + stop: 1 + 4 * 18 + 3 half-bit delays.
    assert_eq!(delay.calls(), 76);
    assert_eq!(delay.total_ns(), 76 * 5_000);
}
