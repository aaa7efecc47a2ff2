//! Error types surfaced by cartridge loading and save-RAM handling.
//!
//! Processor faults are deliberately absent: undefined opcodes lock the
//! processor up (observable through `Cpu::is_halted`) and unmapped bus
//! accesses resolve to open-bus values.

use thiserror::Error;

/// Failure while turning an iNES image into a [`Cartridge`](crate::Cartridge).
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("invalid iNES image: {0}")]
    Format(&'static str),

    #[error("iNES image truncated in {section}: need {needed} bytes, {available} available")]
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),

    #[error("failed to read iNES file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while restoring battery-backed RAM from a host image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveRamError {
    #[error("save RAM image must be exactly {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Malformed line in a header-fix table.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("header fix table line {line}: {reason}")]
pub struct FixupParseError {
    pub line: usize,
    pub reason: String,
}
