//! Reserved symbol codes and the copy-task alphabet.

use crate::api::types::Code;

/// Codes with a fixed meaning in the generated sequences.
///
/// Payload symbols are drawn so that they never take one of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Filler for every slot that carries no payload, and the target outside
    /// the recall window.
    Blank,
    /// Copy task: tells the network to start reproducing the payload.
    Trigger,
    /// Denoise task: marks the end of the noisy input segment.
    Marker,
}

impl Symbol {
    pub const fn code(self) -> Code {
        match self {
            Symbol::Blank => 0,
            Symbol::Trigger => 9,
            Symbol::Marker => 10,
        }
    }

    pub fn from_code(code: Code) -> Option<Self> {
        match code {
            0 => Some(Symbol::Blank),
            9 => Some(Symbol::Trigger),
            10 => Some(Symbol::Marker),
            _ => None,
        }
    }
}

/// The 10-slot copy-task alphabet. Payload slots come first; slot
/// [`COPY_BLANK_SLOT`] holds the blank and slot [`COPY_TRIGGER_SLOT`] the
/// trigger.
pub const COPY_ALPHABET: [Code; 10] = [
    1,
    2,
    3,
    4,
    5,
    6,
    7,
    8,
    Symbol::Blank.code(),
    Symbol::Trigger.code(),
];

pub const COPY_BLANK_SLOT: usize = 8;
pub const COPY_TRIGGER_SLOT: usize = 9;

/// Largest payload alphabet the copy task supports without reaching the
/// reserved slots.
pub const COPY_MAX_LABELS: usize = COPY_BLANK_SLOT;
