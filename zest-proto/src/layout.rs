//! Joystick bit layout inside the shared register block.

/// Word index of the register block where joystick state begins.
pub const JOYSTICK_BASE_WORD: usize = 4;

/// Bits reserved per joystick slot.
pub const SLOT_STRIDE: u32 = 5;

/// Width of the button field.
pub const BUTTON_WIDTH: u32 = 1;

/// Width of an axis direction field.
pub const AXIS_WIDTH: u32 = 2;

/// Number of slots the layout can address without two slots sharing a bit
/// and without any field straddling a 32-bit word.
pub const MAX_SLOTS: usize = 6;

const Y_BASE: u32 = 118;
const X_BASE: u32 = 120;
const BUTTON_BASE: u32 = 122;

/// 2-bit encoding of an axis sign as polled by the hardware core.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DirectionCode {
    /// Never written since reset.
    #[default]
    Unset = 0b00,
    /// Axis value above zero.
    Positive = 0b01,
    /// Axis value below zero.
    Negative = 0b10,
    /// Axis at rest.
    Centered = 0b11,
}

impl DirectionCode {
    /// Encode the sign of an axis value.
    #[inline]
    #[must_use]
    pub const fn from_axis(value: i16) -> Self {
        if value < 0 {
            Self::Negative
        } else if value > 0 {
            Self::Positive
        } else {
            Self::Centered
        }
    }

    /// Decode a 2-bit field value. Upper bits are ignored.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b01 => Self::Positive,
            0b10 => Self::Negative,
            0b11 => Self::Centered,
            _ => Self::Unset,
        }
    }

    /// Raw field value.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

/// Relative bit offsets of one slot's fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotLayout {
    /// Button field (1 bit, inverted).
    pub button: u32,
    /// X direction field (2 bits).
    pub x_axis: u32,
    /// Y direction field (2 bits).
    pub y_axis: u32,
}

impl SlotLayout {
    /// Offsets for the given slot id.
    #[must_use]
    pub const fn for_slot(slot: u8) -> Self {
        let shift = SLOT_STRIDE * slot as u32;
        Self {
            button: BUTTON_BASE + shift,
            x_axis: X_BASE + shift,
            y_axis: Y_BASE + shift,
        }
    }

    /// Field value for a button state. The hardware expects `0` when pressed.
    #[inline]
    #[must_use]
    pub const fn button_bits(pressed: bool) -> u32 {
        !pressed as u32
    }

    /// The three `(offset, width)` ranges owned by this slot.
    #[must_use]
    pub const fn fields(&self) -> [(u32, u32); 3] {
        [
            (self.y_axis, AXIS_WIDTH),
            (self.x_axis, AXIS_WIDTH),
            (self.button, BUTTON_WIDTH),
        ]
    }

    /// Highest relative bit (exclusive) used by any slot below `MAX_SLOTS`.
    #[must_use]
    pub const fn end_of_layout() -> u32 {
        BUTTON_BASE + SLOT_STRIDE * (MAX_SLOTS as u32 - 1) + BUTTON_WIDTH
    }
}
