//! Reply packets sent back to the host.
//!
//! A reply is either the two ASCII bytes `OK`, the single byte `?` for an
//! unrecognised packet, or the raw bytes read from the ADC.  Replies never
//! carry a terminator.

use heapless::Vec;

use crate::transport::MAX_PACKET_SIZE;

pub const OK: &[u8] = b"OK";
pub const UNKNOWN: &[u8] = b"?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    bytes: Vec<u8, MAX_PACKET_SIZE>,
}

impl Reply {
    pub fn ok() -> Self {
        Self::data(OK)
    }

    pub fn unknown() -> Self {
        Self::data(UNKNOWN)
    }

    /// Raw data reply.  Bytes past one packet are dropped.
    pub fn data(data: &[u8]) -> Self {
        let mut bytes = Vec::new();
        for &b in data.iter().take(MAX_PACKET_SIZE) {
            if bytes.push(b).is_err() {
                break;
            }
        }
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_ok(&self) -> bool {
        self.as_bytes() == OK
    }

    pub fn is_unknown(&self) -> bool {
        self.as_bytes() == UNKNOWN
    }
}
