//! Linux joystick (`/dev/input/jsN`) event record.
//!
//! Every `read()` on a joystick node yields one 8-byte record:
//!
//! ```text
//! offset 0  u32  timestamp in milliseconds
//! offset 4  i16  value (axis position, or 0/1 for buttons)
//! offset 6  u8   type  (0x01 button, 0x02 axis, | 0x80 for synthetic init)
//! offset 7  u8   number (button or axis index)
//! ```
//!
//! All multi-byte fields are little-endian on the targets this bridge runs on.

/// Size of one joystick event record in bytes.
pub const JS_EVENT_SIZE: usize = 8;

const JS_EVENT_BUTTON: u8 = 0x01;
const JS_EVENT_AXIS: u8 = 0x02;
const JS_EVENT_INIT: u8 = 0x80;

/// Classification of a joystick event by its `type` byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JsEventKind {
    /// A button changed state.
    Button,
    /// An axis moved.
    Axis,
    /// Synthetic state dump sent by the kernel right after open.
    Init,
    /// Any type byte this bridge does not understand.
    Other(u8),
}

impl JsEventKind {
    /// Classify a raw `type` byte.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        if raw & JS_EVENT_INIT != 0 {
            return Self::Init;
        }
        match raw {
            JS_EVENT_BUTTON => Self::Button,
            JS_EVENT_AXIS => Self::Axis,
            other => Self::Other(other),
        }
    }
}

/// One decoded joystick event.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JsEvent {
    /// Kernel timestamp in milliseconds.
    pub time: u32,
    /// Axis position, or `1`/`0` for pressed/released buttons.
    pub value: i16,
    /// Raw `type` byte.
    pub kind: u8,
    /// Button or axis number.
    pub number: u8,
}

impl JsEvent {
    /// Build a button event.
    #[must_use]
    pub const fn button(number: u8, pressed: bool) -> Self {
        Self {
            time: 0,
            value: pressed as i16,
            kind: JS_EVENT_BUTTON,
            number,
        }
    }

    /// Build an axis event.
    #[must_use]
    pub const fn axis(number: u8, value: i16) -> Self {
        Self {
            time: 0,
            value,
            kind: JS_EVENT_AXIS,
            number,
        }
    }

    /// Decode a record as read from the device.
    #[must_use]
    pub const fn from_bytes(bytes: &[u8; JS_EVENT_SIZE]) -> Self {
        Self {
            time: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            value: i16::from_le_bytes([bytes[4], bytes[5]]),
            kind: bytes[6],
            number: bytes[7],
        }
    }

    /// Encode into the device record format.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; JS_EVENT_SIZE] {
        let t = self.time.to_le_bytes();
        let v = self.value.to_le_bytes();
        [t[0], t[1], t[2], t[3], v[0], v[1], self.kind, self.number]
    }

    /// Classify this event.
    #[inline]
    #[must_use]
    pub const fn event_kind(&self) -> JsEventKind {
        JsEventKind::from_raw(self.kind)
    }
}
