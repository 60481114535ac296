//! Mock hardware adapters for integration tests.
//!
//! Records every bus and pin call so tests can assert on the full
//! operation history without a simulated electrical bus.

use std::collections::VecDeque;

use potentiostat::app::events::InstrumentEvent;
use potentiostat::app::ports::{
    Acknowledge, BusLink, CellState, EventSink, FrontEndPort, Mode, Range,
};
use potentiostat::transport::{CommandTransport, MAX_PACKET_SIZE};

// ── Bus link call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOp {
    Start,
    Stop,
    Write(u8),
    Read(Acknowledge),
    Recover,
}

// ── RecordingLink ─────────────────────────────────────────────

/// A [`BusLink`] that logs operations and serves reads from a queue.
/// An empty queue reads as `0xFF`, like a bus with nothing attached.
#[derive(Default)]
pub struct RecordingLink {
    pub ops: Vec<LinkOp>,
    reads: VecDeque<u8>,
    pub recover_result: bool,
}

#[allow(dead_code)]
impl RecordingLink {
    pub fn new() -> Self {
        Self {
            recover_result: true,
            ..Self::default()
        }
    }

    pub fn queue_reads(&mut self, bytes: &[u8]) {
        self.reads.extend(bytes.iter().copied());
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl BusLink for RecordingLink {
    fn start(&mut self) {
        self.ops.push(LinkOp::Start);
    }

    fn stop(&mut self) {
        self.ops.push(LinkOp::Stop);
    }

    fn write_byte(&mut self, byte: u8) {
        self.ops.push(LinkOp::Write(byte));
    }

    fn read_byte(&mut self, ack: Acknowledge) -> u8 {
        self.ops.push(LinkOp::Read(ack));
        self.reads.pop_front().unwrap_or(0xFF)
    }

    fn recover(&mut self) -> bool {
        self.ops.push(LinkOp::Recover);
        self.recover_result
    }
}

// ── MockFrontEnd ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    Cell(CellState),
    Mode(Mode),
    Range(Range),
}

#[derive(Default)]
pub struct MockFrontEnd {
    pub calls: Vec<PinCall>,
}

#[allow(dead_code)]
impl MockFrontEnd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self) -> Option<CellState> {
        self.calls.iter().rev().find_map(|c| match c {
            PinCall::Cell(s) => Some(*s),
            _ => None,
        })
    }

    pub fn mode(&self) -> Option<Mode> {
        self.calls.iter().rev().find_map(|c| match c {
            PinCall::Mode(m) => Some(*m),
            _ => None,
        })
    }

    pub fn range(&self) -> Option<Range> {
        self.calls.iter().rev().find_map(|c| match c {
            PinCall::Range(r) => Some(*r),
            _ => None,
        })
    }
}

impl FrontEndPort for MockFrontEnd {
    fn set_cell(&mut self, state: CellState) {
        self.calls.push(PinCall::Cell(state));
    }

    fn set_mode(&mut self, mode: Mode) {
        self.calls.push(PinCall::Mode(mode));
    }

    fn set_range(&mut self, range: Range) {
        self.calls.push(PinCall::Range(range));
    }
}

// ── LogSink ───────────────────────────────────────────────────

/// Collects every emitted event.
#[derive(Default)]
pub struct LogSink {
    pub events: Vec<InstrumentEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &InstrumentEvent) {
        self.events.push(event.clone());
    }
}

// ── ScriptedTransport ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockTransportError;

/// Delivers a fixed list of packets and records every reply.
#[derive(Default)]
pub struct ScriptedTransport {
    inbox: VecDeque<Vec<u8>>,
    pub sent: Vec<Vec<u8>>,
    pub fail_receive: bool,
    pub fail_send: bool,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(packets: &[&[u8]]) -> Self {
        Self {
            inbox: packets.iter().map(|p| p.to_vec()).collect(),
            ..Self::default()
        }
    }
}

impl CommandTransport for ScriptedTransport {
    type Error = MockTransportError;

    fn receive(
        &mut self,
        packet: &mut [u8; MAX_PACKET_SIZE],
    ) -> Result<Option<usize>, MockTransportError> {
        if self.fail_receive {
            return Err(MockTransportError);
        }
        let Some(next) = self.inbox.pop_front() else {
            return Ok(None);
        };
        let len = next.len().min(MAX_PACKET_SIZE);
        packet[..len].copy_from_slice(&next[..len]);
        Ok(Some(len))
    }

    fn send(&mut self, reply: &[u8]) -> Result<(), MockTransportError> {
        if self.fail_send {
            return Err(MockTransportError);
        }
        self.sent.push(reply.to_vec());
        Ok(())
    }
}
