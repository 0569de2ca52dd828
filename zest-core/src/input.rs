//! Event source trait and error types.

use core::fmt;
use zest_proto::JsEvent;

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// Device I/O error.
    Io,
    /// Fewer bytes than one event record were returned.
    ShortRead,
    /// The read was interrupted before any data arrived.
    Interrupted,
    /// The device is gone (end of file, or the node was unplugged).
    Disconnected,
}

impl InputError {
    /// Whether this error means the device will never produce data again.
    #[inline]
    #[must_use]
    pub const fn is_disconnect(self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => f.write_str("device I/O error"),
            Self::ShortRead => f.write_str("short read from device"),
            Self::Interrupted => f.write_str("read interrupted"),
            Self::Disconnected => f.write_str("device disconnected"),
        }
    }
}

/// Blocking source of joystick events.
///
/// This trait abstracts the device node so the slot worker can be driven by
/// a real `/dev/input/jsN` reader or by a scripted source in tests.
pub trait EventSource {
    /// Block until the next event arrives.
    fn next_event(&mut self) -> Result<JsEvent, InputError>;

    /// Check if the source still has an open device behind it.
    fn is_connected(&self) -> bool;
}

impl<T: EventSource + ?Sized> EventSource for &mut T {
    fn next_event(&mut self) -> Result<JsEvent, InputError> {
        (**self).next_event()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
