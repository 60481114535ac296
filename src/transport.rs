//! Transport abstraction: the host's command pipe.
//!
//! On the reference board this is a USB bulk endpoint pair: one OUT
//! packet is one command, one IN packet is its reply.  Any byte channel
//! that preserves those boundaries can stand in for it.

/// Full-speed USB bulk endpoint size; no command or reply is longer.
pub const MAX_PACKET_SIZE: usize = 64;

/// Packet-oriented command channel.
pub trait CommandTransport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Copy the next command into `packet`.
    /// Returns its length, or `None` if no command is pending.
    fn receive(&mut self, packet: &mut [u8; MAX_PACKET_SIZE]) -> Result<Option<usize>, Self::Error>;

    /// Transmit one reply packet.
    fn send(&mut self, reply: &[u8]) -> Result<(), Self::Error>;
}

/// A null transport that never delivers a command and discards replies.
pub struct NullTransport;

impl CommandTransport for NullTransport {
    type Error = ();

    fn receive(&mut self, _packet: &mut [u8; MAX_PACKET_SIZE]) -> Result<Option<usize>, ()> {
        Ok(None)
    }

    fn send(&mut self, _reply: &[u8]) -> Result<(), ()> {
        Ok(())
    }
}
