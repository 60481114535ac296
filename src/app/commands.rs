//! Host command vocabulary and its classification table.
//!
//! A command is recognised by **exact length and content**, checked row by
//! row in table order; the first matching row wins.  Two rows carry raw
//! binary parameters after a literal prefix (`DACSET `, `ADCCONF `); for
//! those the prefix must match and the total length must be exact, and
//! any byte value 0–255 is a valid parameter.
//!
//! ```text
//!  ┌───────────────────┬─────┬──────────────────────────┐
//!  │ pattern           │ len │ decoded as               │
//!  ├───────────────────┼─────┼──────────────────────────┤
//!  │ CELL ON           │  7  │ CellOn                   │
//!  │ CELL OFF          │  8  │ CellOff                  │
//!  │ POTENTIOSTATIC    │ 14  │ Potentiostatic           │
//!  │ GALVANOSTATIC     │ 13  │ Galvanostatic            │
//!  │ RANGE 1 .. 4      │  7  │ SetRange(R1..R4)         │
//!  │ DACSET ␣ hi lo    │  9  │ DacSet { hi, lo }        │
//!  │ ADCCONF ␣ cfg     │  9  │ AdcConfigure(cfg)        │
//!  │ ADCREAD3          │  8  │ AdcRead3                 │
//!  │ ADCREAD4          │  8  │ AdcRead4                 │
//!  └───────────────────┴─────┴──────────────────────────┘
//! ```

use super::ports::Range;

/// A classified host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CellOn,
    CellOff,
    Potentiostatic,
    Galvanostatic,
    SetRange(Range),
    /// Load `hi:lo` into the DAC.
    DacSet { hi: u8, lo: u8 },
    /// Write the ADC configuration register.
    AdcConfigure(u8),
    /// Read two data bytes + config from the ADC.
    AdcRead3,
    /// Read three data bytes + config from the ADC.
    AdcRead4,
}

impl Command {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CellOn => "CELL ON",
            Self::CellOff => "CELL OFF",
            Self::Potentiostatic => "POTENTIOSTATIC",
            Self::Galvanostatic => "GALVANOSTATIC",
            Self::SetRange(_) => "RANGE",
            Self::DacSet { .. } => "DACSET",
            Self::AdcConfigure(_) => "ADCCONF",
            Self::AdcRead3 => "ADCREAD3",
            Self::AdcRead4 => "ADCREAD4",
        }
    }

    /// Encode the command in host wire format.
    pub fn to_wire(&self) -> heapless::Vec<u8, 16> {
        let mut out = heapless::Vec::new();
        let (literal, params): (&[u8], &[u8]) = match self {
            Self::CellOn => (b"CELL ON", &[]),
            Self::CellOff => (b"CELL OFF", &[]),
            Self::Potentiostatic => (b"POTENTIOSTATIC", &[]),
            Self::Galvanostatic => (b"GALVANOSTATIC", &[]),
            Self::SetRange(Range::R1) => (b"RANGE 1", &[]),
            Self::SetRange(Range::R2) => (b"RANGE 2", &[]),
            Self::SetRange(Range::R3) => (b"RANGE 3", &[]),
            Self::SetRange(Range::R4) => (b"RANGE 4", &[]),
            Self::DacSet { hi, lo } => {
                let _ = out.extend_from_slice(b"DACSET ");
                let _ = out.push(*hi);
                let _ = out.push(*lo);
                return out;
            }
            Self::AdcConfigure(cfg) => {
                let _ = out.extend_from_slice(b"ADCCONF ");
                let _ = out.push(*cfg);
                return out;
            }
            Self::AdcRead3 => (b"ADCREAD3", &[]),
            Self::AdcRead4 => (b"ADCREAD4", &[]),
        };
        let _ = out.extend_from_slice(literal);
        let _ = out.extend_from_slice(params);
        out
    }
}

// ---------------------------------------------------------------------------
// Classification table
// ---------------------------------------------------------------------------

/// Signature for turning a matched packet into a [`Command`].
/// Only called once length and prefix have matched.
pub type DecodeFn = fn(&[u8]) -> Command;

/// One row of the classification table.
pub struct CommandPattern {
    /// Bytes the packet must start with.
    pub literal: &'static [u8],
    /// Exact packet length, literal plus parameter bytes.
    pub len: usize,
    pub decode: DecodeFn,
}

impl CommandPattern {
    fn matches(&self, packet: &[u8]) -> bool {
        packet.len() == self.len && packet.starts_with(self.literal)
    }
}

/// The command table, in priority order.
pub static COMMAND_TABLE: [CommandPattern; 12] = [
    CommandPattern { literal: b"CELL ON", len: 7, decode: cell_on },
    CommandPattern { literal: b"CELL OFF", len: 8, decode: cell_off },
    CommandPattern { literal: b"POTENTIOSTATIC", len: 14, decode: potentiostatic },
    CommandPattern { literal: b"GALVANOSTATIC", len: 13, decode: galvanostatic },
    CommandPattern { literal: b"RANGE 1", len: 7, decode: range1 },
    CommandPattern { literal: b"RANGE 2", len: 7, decode: range2 },
    CommandPattern { literal: b"RANGE 3", len: 7, decode: range3 },
    CommandPattern { literal: b"RANGE 4", len: 7, decode: range4 },
    CommandPattern { literal: b"DACSET ", len: 9, decode: dac_set },
    CommandPattern { literal: b"ADCCONF ", len: 9, decode: adc_configure },
    CommandPattern { literal: b"ADCREAD3", len: 8, decode: adc_read3 },
    CommandPattern { literal: b"ADCREAD4", len: 8, decode: adc_read4 },
];

/// Classify a packet.  `None` means the packet is not a command.
pub fn classify(packet: &[u8]) -> Option<Command> {
    COMMAND_TABLE
        .iter()
        .find(|row| row.matches(packet))
        .map(|row| (row.decode)(packet))
}

fn cell_on(_: &[u8]) -> Command {
    Command::CellOn
}

fn cell_off(_: &[u8]) -> Command {
    Command::CellOff
}

fn potentiostatic(_: &[u8]) -> Command {
    Command::Potentiostatic
}

fn galvanostatic(_: &[u8]) -> Command {
    Command::Galvanostatic
}

fn range1(_: &[u8]) -> Command {
    Command::SetRange(Range::R1)
}

fn range2(_: &[u8]) -> Command {
    Command::SetRange(Range::R2)
}

fn range3(_: &[u8]) -> Command {
    Command::SetRange(Range::R3)
}

fn range4(_: &[u8]) -> Command {
    Command::SetRange(Range::R4)
}

fn dac_set(p: &[u8]) -> Command {
    Command::DacSet { hi: p[7], lo: p[8] }
}

fn adc_configure(p: &[u8]) -> Command {
    Command::AdcConfigure(p[8])
}

fn adc_read3(_: &[u8]) -> Command {
    Command::AdcRead3
}

fn adc_read4(_: &[u8]) -> Command {
    Command::AdcRead4
}
