//! Instrument service: the hexagonal core.
//!
//! [`Instrument`] owns the bus link, the front end and the two device
//! transaction helpers.  It turns one host packet into exactly one reply
//! and keeps no state between packets: every command is self-contained.
//!
//! ```text
//!  CommandTransport ──▶ ┌──────────────────────┐ ──▶ EventSink
//!                       │      Instrument      │
//!      FrontEndPort ◀── │ classify · execute   │ ──▶ BusLink (DAC, ADC)
//!                       └──────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::{FrontEndState, SystemConfig};
use crate::drivers::max5217::Max5217;
use crate::drivers::mcp3422::Mcp3422;
use crate::error::{Error, Result, TransportError};
use crate::transport::{CommandTransport, MAX_PACKET_SIZE};

use super::commands::{Command, classify};
use super::events::InstrumentEvent;
use super::ports::{BusLink, CellState, EventSink, FrontEndPort, Mode};
use super::reply::Reply;

// ───────────────────────────────────────────────────────────────
// Instrument
// ───────────────────────────────────────────────────────────────

pub struct Instrument<L, F> {
    link: L,
    front_end: F,
    dac: Max5217,
    adc: Mcp3422,
    power_on: FrontEndState,
}

impl<L: BusLink, F: FrontEndPort> Instrument<L, F> {
    /// Construct the instrument.  Nothing is driven until [`start`](Self::start).
    pub fn new(config: &SystemConfig, link: L, front_end: F) -> Self {
        Self {
            link,
            front_end,
            dac: Max5217::new(&config.dac),
            adc: Mcp3422::new(&config.adc),
            power_on: config.power_on,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Apply the power-on front-end state and free the bus.
    ///
    /// Mode and range are set before the cell relay so the cell is never
    /// connected in a stale configuration.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let s = self.power_on;
        self.front_end.set_mode(s.mode);
        self.front_end.set_range(s.range);
        self.front_end.set_cell(s.cell);

        let bus_idle = self.link.recover();
        if !bus_idle {
            warn!("instrument: bus still held after recovery");
        }
        sink.emit(&InstrumentEvent::Started { bus_idle });
        info!("instrument: started {:?}", s);
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Classify one packet and execute it.  Unrecognised packets get `?`
    /// and cause no hardware activity.
    pub fn handle(&mut self, packet: &[u8], sink: &mut impl EventSink) -> Reply {
        match classify(packet) {
            Some(command) => {
                let reply = self.execute(command);
                debug!("instrument: {} -> {} bytes", command.name(), reply.len());
                sink.emit(&InstrumentEvent::CommandHandled {
                    command,
                    reply_len: reply.len(),
                });
                reply
            }
            None => {
                sink.emit(&InstrumentEvent::UnknownCommand { len: packet.len() });
                Reply::unknown()
            }
        }
    }

    /// Execute an already classified command.
    pub fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::CellOn => {
                self.front_end.set_cell(CellState::On);
                Reply::ok()
            }
            Command::CellOff => {
                self.front_end.set_cell(CellState::Off);
                Reply::ok()
            }
            Command::Potentiostatic => {
                self.front_end.set_mode(Mode::Potentiostatic);
                Reply::ok()
            }
            Command::Galvanostatic => {
                self.front_end.set_mode(Mode::Galvanostatic);
                Reply::ok()
            }
            Command::SetRange(range) => {
                self.front_end.set_range(range);
                Reply::ok()
            }
            Command::DacSet { hi, lo } => {
                self.dac.load_code(&mut self.link, hi, lo);
                Reply::ok()
            }
            Command::AdcConfigure(config) => {
                self.adc.configure(&mut self.link, config);
                Reply::ok()
            }
            Command::AdcRead3 => Reply::data(&self.adc.read3(&mut self.link)),
            Command::AdcRead4 => Reply::data(&self.adc.read4(&mut self.link)),
        }
    }

    /// Poll the transport once.  Returns `Ok(true)` if a packet was
    /// handled and its reply sent, `Ok(false)` if nothing was pending.
    pub fn serve_once<T: CommandTransport>(
        &mut self,
        transport: &mut T,
        sink: &mut impl EventSink,
    ) -> Result<bool> {
        let mut packet = [0u8; MAX_PACKET_SIZE];
        let len = match transport.receive(&mut packet) {
            Ok(Some(len)) => len.min(MAX_PACKET_SIZE),
            Ok(None) => return Ok(false),
            Err(e) => {
                warn!("instrument: receive failed: {:?}", e);
                return Err(self.transport_failed(TransportError::ReceiveFailed, sink));
            }
        };

        let reply = self.handle(&packet[..len], sink);
        if let Err(e) = transport.send(reply.as_bytes()) {
            warn!("instrument: send failed: {:?}", e);
            return Err(self.transport_failed(TransportError::SendFailed, sink));
        }
        Ok(true)
    }

    fn transport_failed(&self, e: TransportError, sink: &mut impl EventSink) -> Error {
        sink.emit(&InstrumentEvent::TransportFailed(e));
        e.into()
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn front_end(&self) -> &F {
        &self.front_end
    }

    pub fn into_parts(self) -> (L, F) {
        (self.link, self.front_end)
    }
}
