//! UART command transport (ESP-IDF target).
//!
//! The host writes one command as one burst.  Parameter bytes are raw
//! binary, so there is no delimiter to split on: a packet ends when the
//! line has been idle for `gap` or when [`MAX_PACKET_SIZE`] bytes have
//! arrived.  Each reply is written as one burst.

use esp_idf_hal::delay::TickType;
use esp_idf_hal::uart::UartDriver;
use esp_idf_sys::EspError;
use log::trace;

use crate::transport::{CommandTransport, MAX_PACKET_SIZE};

/// Default inter-packet idle gap.
pub const PACKET_GAP_MS: u64 = 5;

/// How long [`receive`](CommandTransport::receive) waits for the first byte.
pub const POLL_TIMEOUT_MS: u64 = 10;

pub struct UartTransport<'d> {
    uart: UartDriver<'d>,
    gap_ticks: u32,
    poll_ticks: u32,
}

impl<'d> UartTransport<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self {
            uart,
            gap_ticks: TickType::new_millis(PACKET_GAP_MS).ticks(),
            poll_ticks: TickType::new_millis(POLL_TIMEOUT_MS).ticks(),
        }
    }
}

impl CommandTransport for UartTransport<'_> {
    type Error = EspError;

    fn receive(&mut self, packet: &mut [u8; MAX_PACKET_SIZE]) -> Result<Option<usize>, EspError> {
        let mut len = self.uart.read(&mut packet[..], self.poll_ticks)?;
        if len == 0 {
            return Ok(None);
        }
        while len < MAX_PACKET_SIZE {
            let n = self.uart.read(&mut packet[len..], self.gap_ticks)?;
            if n == 0 {
                break;
            }
            len += n;
        }
        trace!("uart: packet {} bytes", len);
        Ok(Some(len))
    }

    fn send(&mut self, reply: &[u8]) -> Result<(), EspError> {
        let mut sent = 0;
        while sent < reply.len() {
            sent += self.uart.write(&reply[sent..])?;
        }
        Ok(())
    }
}
