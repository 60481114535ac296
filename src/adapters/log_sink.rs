//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing instrument events to the `log`
//! facade (the ESP-IDF logger on target, whatever the test harness
//! installs on the host).

use log::{debug, info, warn};

use crate::app::events::InstrumentEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`InstrumentEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    handled: u32,
    unknown: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands executed since construction.
    pub fn handled(&self) -> u32 {
        self.handled
    }

    /// Packets answered with `?` since construction.
    pub fn unknown(&self) -> u32 {
        self.unknown
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &InstrumentEvent) {
        match event {
            InstrumentEvent::Started { bus_idle } => {
                info!("START | bus={}", if *bus_idle { "idle" } else { "HELD" });
            }
            InstrumentEvent::CommandHandled { command, reply_len } => {
                self.handled = self.handled.wrapping_add(1);
                debug!("CMD | {:?} | reply={}B", command, reply_len);
            }
            InstrumentEvent::UnknownCommand { len } => {
                self.unknown = self.unknown.wrapping_add(1);
                warn!("CMD | unrecognised packet ({} bytes)", len);
            }
            InstrumentEvent::TransportFailed(e) => {
                warn!("HOST | {}", e);
            }
        }
    }
}
