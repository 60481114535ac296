//! Outbound instrument events.
//!
//! The [`Instrument`](super::service::Instrument) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::TransportError;

use super::commands::Command;

/// Structured events emitted by the instrument core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrumentEvent {
    /// Power-on state applied.  `bus_idle` is false if bus recovery could
    /// not release the data line.
    Started { bus_idle: bool },

    /// A command was executed and `reply_len` bytes were returned.
    CommandHandled { command: Command, reply_len: usize },

    /// A packet matched no command; `?` was returned.
    UnknownCommand { len: usize },

    /// The host transport failed.
    TransportFailed(TransportError),
}
