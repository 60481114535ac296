//! Integration tests for the host packet → Instrument → hardware pipeline.
//!
//! Each test feeds raw packets to the instrument and asserts on the reply
//! bytes together with the exact bus and pin activity they caused.

use super::mock_hw::{
    LinkOp, LogSink, MockFrontEnd, PinCall, RecordingLink, ScriptedTransport,
};

use potentiostat::app::commands::Command;
use potentiostat::app::events::InstrumentEvent;
use potentiostat::app::ports::{Acknowledge, CellState, Mode, Range};
use potentiostat::app::service::Instrument;
use potentiostat::config::SystemConfig;
use potentiostat::error::{Error, TransportError};

fn make_instrument() -> (Instrument<RecordingLink, MockFrontEnd>, LogSink) {
    let inst = Instrument::new(
        &SystemConfig::default(),
        RecordingLink::new(),
        MockFrontEnd::new(),
    );
    (inst, LogSink::new())
}

// ── Front-end commands ────────────────────────────────────────

#[test]
fn cell_on_and_off() {
    let (mut inst, mut sink) = make_instrument();

    assert_eq!(inst.handle(b"CELL ON", &mut sink).as_bytes(), b"OK");
    assert_eq!(inst.front_end().cell(), Some(CellState::On));

    assert_eq!(inst.handle(b"CELL OFF", &mut sink).as_bytes(), b"OK");
    assert_eq!(inst.front_end().cell(), Some(CellState::Off));

    assert!(inst.link().ops.is_empty(), "front-end commands must not touch the bus");
}

#[test]
fn mode_switching() {
    let (mut inst, mut sink) = make_instrument();

    assert_eq!(inst.handle(b"GALVANOSTATIC", &mut sink).as_bytes(), b"OK");
    assert_eq!(inst.front_end().mode(), Some(Mode::Galvanostatic));

    assert_eq!(inst.handle(b"POTENTIOSTATIC", &mut sink).as_bytes(), b"OK");
    assert_eq!(inst.front_end().mode(), Some(Mode::Potentiostatic));
}

#[test]
fn each_range_command_selects_its_range() {
    let (mut inst, mut sink) = make_instrument();
    let packets: [&[u8]; 4] = [b"RANGE 1", b"RANGE 2", b"RANGE 3", b"RANGE 4"];

    for (packet, range) in packets.iter().zip(Range::ALL) {
        assert_eq!(inst.handle(packet, &mut sink).as_bytes(), b"OK");
        assert_eq!(inst.front_end().range(), Some(range));
    }
    assert_eq!(inst.front_end().calls.len(), 4);
}

// ── Unrecognised packets ──────────────────────────────────────

#[test]
fn near_misses_reply_question_mark_and_do_nothing() {
    let (mut inst, mut sink) = make_instrument();
    let packets: [&[u8]; 9] = [
        b"CELL ONN",
        b"CELL ON ",
        b"cell on",
        b"RANGE 0",
        b"RANGE 5",
        b"DACSET \x12",
        b"DACSET \x12\x34\x56",
        b"ADCREAD5",
        b"",
    ];

    for packet in packets {
        let reply = inst.handle(packet, &mut sink);
        assert_eq!(reply.as_bytes(), b"?", "packet {:?}", packet);
    }
    assert!(inst.link().ops.is_empty());
    assert!(inst.front_end().calls.is_empty());
    assert!(
        sink.events
            .iter()
            .all(|e| matches!(e, InstrumentEvent::UnknownCommand { .. }))
    );
}

// ── DAC ───────────────────────────────────────────────────────

#[test]
fn dacset_writes_code_load_frame() {
    let (mut inst, mut sink) = make_instrument();

    let reply = inst.handle(b"DACSET \x12\x34", &mut sink);
    assert_eq!(reply.as_bytes(), b"OK");
    assert_eq!(
        inst.link().ops,
        vec![
            LinkOp::Start,
            LinkOp::Write(0x3A),
            LinkOp::Write(0x01),
            LinkOp::Write(0x12),
            LinkOp::Write(0x34),
            LinkOp::Stop,
        ]
    );
}

#[test]
fn repeated_dacset_is_idempotent_on_the_wire() {
    let (mut inst, mut sink) = make_instrument();

    inst.handle(b"DACSET \xFF\x00", &mut sink);
    let first = inst.link().ops.clone();
    inst.handle(b"DACSET \xFF\x00", &mut sink);
    let ops = &inst.link().ops;

    assert_eq!(ops.len(), first.len() * 2);
    assert_eq!(&ops[first.len()..], first.as_slice());
}

// ── ADC ───────────────────────────────────────────────────────

#[test]
fn adcconf_writes_config_byte() {
    let (mut inst, mut sink) = make_instrument();

    assert_eq!(inst.handle(b"ADCCONF \x9C", &mut sink).as_bytes(), b"OK");
    assert_eq!(
        inst.link().ops,
        vec![LinkOp::Start, LinkOp::Write(0xD0), LinkOp::Write(0x9C), LinkOp::Stop]
    );
}

#[test]
fn adcread3_acks_two_and_nacks_last() {
    let mut link = RecordingLink::new();
    link.queue_reads(&[0x01, 0x02, 0x90]);
    let mut inst = Instrument::new(&SystemConfig::default(), link, MockFrontEnd::new());
    let mut sink = LogSink::new();

    let reply = inst.handle(b"ADCREAD3", &mut sink);
    assert_eq!(reply.as_bytes(), &[0x01, 0x02, 0x90]);
    assert_eq!(
        inst.link().ops,
        vec![
            LinkOp::Start,
            LinkOp::Write(0xD1),
            LinkOp::Read(Acknowledge::Ack),
            LinkOp::Read(Acknowledge::Ack),
            LinkOp::Read(Acknowledge::Nack),
            LinkOp::Stop,
        ]
    );
}

#[test]
fn adcread4_returns_bytes_in_bus_order() {
    let mut link = RecordingLink::new();
    link.queue_reads(&[0x01, 0xFF, 0x80, 0x9C]);
    let mut inst = Instrument::new(&SystemConfig::default(), link, MockFrontEnd::new());
    let mut sink = LogSink::new();

    let reply = inst.handle(b"ADCREAD4", &mut sink);
    assert_eq!(reply.as_bytes(), &[0x01, 0xFF, 0x80, 0x9C]);

    let reads: Vec<_> = inst
        .link()
        .ops
        .iter()
        .filter_map(|op| match op {
            LinkOp::Read(a) => Some(*a),
            _ => None,
        })
        .collect();
    assert_eq!(
        reads,
        vec![Acknowledge::Ack, Acknowledge::Ack, Acknowledge::Ack, Acknowledge::Nack]
    );
}

#[test]
fn adc_read_with_no_device_returns_ff() {
    let (mut inst, mut sink) = make_instrument();
    let reply = inst.handle(b"ADCREAD3", &mut sink);
    assert_eq!(reply.as_bytes(), &[0xFF, 0xFF, 0xFF]);
}

// ── Lifecycle and events ──────────────────────────────────────

#[test]
fn start_applies_power_on_state_and_recovers_bus() {
    let (mut inst, mut sink) = make_instrument();
    inst.start(&mut sink);

    let fe = inst.front_end();
    assert_eq!(fe.cell(), Some(CellState::Off));
    assert_eq!(fe.mode(), Some(Mode::Potentiostatic));
    assert_eq!(fe.range(), Some(Range::R1));
    assert_eq!(fe.calls.last(), Some(&PinCall::Cell(CellState::Off)));
    assert_eq!(inst.link().ops, vec![LinkOp::Recover]);
    assert_eq!(sink.events, vec![InstrumentEvent::Started { bus_idle: true }]);
}

#[test]
fn start_reports_held_bus() {
    let mut link = RecordingLink::new();
    link.recover_result = false;
    let mut inst = Instrument::new(&SystemConfig::default(), link, MockFrontEnd::new());
    let mut sink = LogSink::new();

    inst.start(&mut sink);
    assert_eq!(sink.events, vec![InstrumentEvent::Started { bus_idle: false }]);
}

#[test]
fn handled_commands_are_reported() {
    let (mut inst, mut sink) = make_instrument();
    inst.handle(b"ADCREAD4", &mut sink);
    assert_eq!(
        sink.events,
        vec![InstrumentEvent::CommandHandled {
            command: Command::AdcRead4,
            reply_len: 4,
        }]
    );
}

// ── Transport loop ────────────────────────────────────────────

#[test]
fn serve_once_answers_each_packet_in_order() {
    let (mut inst, mut sink) = make_instrument();
    let mut transport = ScriptedTransport::new(&[b"CELL ON", b"BOGUS", b"RANGE 2"]);

    while inst.serve_once(&mut transport, &mut sink) == Ok(true) {}

    assert_eq!(
        transport.sent,
        vec![b"OK".to_vec(), b"?".to_vec(), b"OK".to_vec()]
    );
    assert_eq!(inst.front_end().range(), Some(Range::R2));
}

#[test]
fn serve_once_with_nothing_pending_sends_nothing() {
    let (mut inst, mut sink) = make_instrument();
    let mut transport = ScriptedTransport::new(&[]);

    assert_eq!(inst.serve_once(&mut transport, &mut sink), Ok(false));
    assert!(transport.sent.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn receive_failure_is_reported_and_skips_dispatch() {
    let (mut inst, mut sink) = make_instrument();
    let mut transport = ScriptedTransport::new(&[b"CELL ON"]);
    transport.fail_receive = true;

    let result = inst.serve_once(&mut transport, &mut sink);
    assert_eq!(result, Err(Error::Transport(TransportError::ReceiveFailed)));
    assert!(inst.front_end().calls.is_empty());
    assert_eq!(
        sink.events,
        vec![InstrumentEvent::TransportFailed(TransportError::ReceiveFailed)]
    );
}

#[test]
fn send_failure_after_execution_is_reported() {
    let (mut inst, mut sink) = make_instrument();
    let mut transport = ScriptedTransport::new(&[b"CELL ON"]);
    transport.fail_send = true;

    let result = inst.serve_once(&mut transport, &mut sink);
    assert_eq!(result, Err(Error::Transport(TransportError::SendFailed)));
    // The command already ran; only the reply was lost.
    assert_eq!(inst.front_end().cell(), Some(CellState::On));
    assert_eq!(
        sink.events.last(),
        Some(&InstrumentEvent::TransportFailed(TransportError::SendFailed))
    );
}
