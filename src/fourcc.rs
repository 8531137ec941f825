//! Four-character codec tags.
//!
//! A FourCC is the 32-bit codec identifier used by legacy video containers
//! (AVI most prominently). Wrapping it in a checked value type means a tag
//! that reaches the sink is always four printable-ASCII characters, and the
//! integer form can be handed to the container layer verbatim.

use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// A validated four-character code, packed big-endian: the first character
/// occupies the most significant byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FourCc(u32);

impl FourCc {
    /// Pack a 4-character printable-ASCII string into a FourCC value.
    ///
    /// Fails when the input is not exactly four bytes long or contains any
    /// byte outside `0x20..=0x7E`.
    pub fn new(code: &str) -> Result<Self, PipelineError> {
        let bytes = code.as_bytes();
        if bytes.len() != 4 {
            return Err(PipelineError::InvalidArgument(format!(
                "FourCC must be exactly four characters, got {:?}",
                code
            )));
        }
        let mut value = 0u32;
        for &b in bytes {
            if !(0x20..=0x7E).contains(&b) {
                return Err(PipelineError::InvalidArgument(format!(
                    "FourCC must be printable ASCII, got byte 0x{:02X} in {:?}",
                    b, code
                )));
            }
            value = (value << 8) | u32::from(b);
        }
        Ok(Self(value))
    }

    /// The packed 32-bit value, as handed to the sink configuration.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Reconstruct from a packed value. Fails when any extracted byte falls
    /// outside the printable-ASCII range, so `FourCc` stays canonical.
    pub fn from_u32(value: u32) -> Result<Self, PipelineError> {
        for shift in [24u32, 16, 8, 0] {
            let b = ((value >> shift) & 0xFF) as u8;
            if !(0x20..=0x7E).contains(&b) {
                return Err(PipelineError::InvalidArgument(format!(
                    "0x{:08X} is not a printable-ASCII FourCC (byte 0x{:02X})",
                    value, b
                )));
            }
        }
        Ok(Self(value))
    }
}

impl FromStr for FourCc {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for shift in [24u32, 16, 8, 0] {
            let b = ((self.0 >> shift) & 0xFF) as u8;
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}
