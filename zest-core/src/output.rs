//! Register sink trait and error types.

use core::fmt;

/// Error type for register accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError {
    /// The field lies beyond the mapped words.
    OutOfRange { offset: u32, width: u32 },
    /// The field would cross a 32-bit word boundary.
    StraddlesWord { offset: u32, width: u32 },
    /// Width must be between 1 and 32.
    InvalidWidth(u32),
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OutOfRange { offset, width } => {
                write!(f, "bits {offset}..{} are outside the register file", offset + width)
            }
            Self::StraddlesWord { offset, width } => {
                write!(f, "bits {offset}..{} cross a word boundary", offset + width)
            }
            Self::InvalidWidth(width) => write!(f, "invalid field width {width}"),
        }
    }
}

/// Destination for bit-level register writes.
///
/// Offsets are relative to the joystick base word. Implementations must
/// leave every bit outside `[offset, offset + width)` untouched, even when
/// several threads write to the same word.
pub trait RegisterSink {
    /// Replace the field with the low `width` bits of `value`.
    fn write_bits(&self, offset: u32, width: u32, value: u32) -> Result<(), RegisterError>;

    /// Read the field back.
    fn read_bits(&self, offset: u32, width: u32) -> Result<u32, RegisterError>;
}

impl<T: RegisterSink + ?Sized> RegisterSink for &T {
    fn write_bits(&self, offset: u32, width: u32, value: u32) -> Result<(), RegisterError> {
        (**self).write_bits(offset, width, value)
    }

    fn read_bits(&self, offset: u32, width: u32) -> Result<u32, RegisterError> {
        (**self).read_bits(offset, width)
    }
}

#[cfg(feature = "std")]
impl<T: RegisterSink + ?Sized> RegisterSink for std::sync::Arc<T> {
    fn write_bits(&self, offset: u32, width: u32, value: u32) -> Result<(), RegisterError> {
        (**self).write_bits(offset, width, value)
    }

    fn read_bits(&self, offset: u32, width: u32) -> Result<u32, RegisterError> {
        (**self).read_bits(offset, width)
    }
}
