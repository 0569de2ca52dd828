//! JoystickSlot: translation of joystick events into register fields.

use crate::output::{RegisterError, RegisterSink};
use heapless::Vec;
use log::trace;
use zest_proto::{
    DirectionCode, JsEvent, JsEventKind, SlotLayout, AXIS_WIDTH, BUTTON_WIDTH, MAX_SLOTS,
};

/// Number of analog axis pairs tracked per controller.
pub const AXIS_COUNT: usize = 3;

/// Last seen position of one axis pair.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisState {
    pub x: i16,
    pub y: i16,
}

/// A single register field update produced by an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterWrite {
    pub offset: u32,
    pub width: u32,
    pub value: u32,
}

/// One physical controller's logical slot.
///
/// The slot id fixes where the controller's button and direction fields
/// live in the register block; the cached axes decide which direction code
/// is written when an axis moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoystickSlot {
    id: u8,
    layout: SlotLayout,
    axes: [AxisState; AXIS_COUNT],
}

impl JoystickSlot {
    /// Create slot `id` with all axes centred.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self {
            id,
            layout: SlotLayout::for_slot(id),
            axes: [AxisState { x: 0, y: 0 }; AXIS_COUNT],
        }
    }

    /// Get the slot id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// Get the register fields owned by this slot.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    /// Get the cached axis positions.
    #[inline]
    #[must_use]
    pub const fn axes(&self) -> &[AxisState; AXIS_COUNT] {
        &self.axes
    }

    /// Update cached state from `event` and return the field write it implies.
    ///
    /// - Buttons write the inverted pressed flag to the button bit.
    /// - Axis `n` updates pair `n / 2` (`x` for even `n`, `y` for odd) and
    ///   writes the direction code of the updated value to the matching
    ///   X or Y field.
    /// - Axes beyond [`AXIS_COUNT`] pairs, init events and unknown kinds
    ///   produce nothing.
    pub fn translate(&mut self, event: &JsEvent) -> Option<RegisterWrite> {
        match event.event_kind() {
            JsEventKind::Button => {
                let pressed = event.value != 0;
                trace!(
                    "slot {}: button {} {}",
                    self.id,
                    event.number,
                    if pressed { "pressed" } else { "released" }
                );
                Some(RegisterWrite {
                    offset: self.layout.button,
                    width: BUTTON_WIDTH,
                    value: SlotLayout::button_bits(pressed),
                })
            }
            JsEventKind::Axis => {
                let pair = usize::from(event.number / 2);
                let axis = self.axes.get_mut(pair)?;
                let (offset, cached) = if event.number % 2 == 0 {
                    axis.x = event.value;
                    (self.layout.x_axis, axis.x)
                } else {
                    axis.y = event.value;
                    (self.layout.y_axis, axis.y)
                };
                trace!(
                    "slot {}: axis {} at ({}, {})",
                    self.id,
                    pair,
                    axis.x,
                    axis.y
                );
                Some(RegisterWrite {
                    offset,
                    width: AXIS_WIDTH,
                    value: DirectionCode::from_axis(cached).bits(),
                })
            }
            JsEventKind::Init | JsEventKind::Other(_) => None,
        }
    }

    /// Translate `event` and commit the resulting write to `registers`.
    pub fn apply<R: RegisterSink + ?Sized>(
        &mut self,
        event: &JsEvent,
        registers: &R,
    ) -> Result<Option<RegisterWrite>, RegisterError> {
        let Some(write) = self.translate(event) else {
            return Ok(None);
        };
        registers.write_bits(write.offset, write.width, write.value)?;
        Ok(Some(write))
    }
}

/// Assign sequential slot ids for devices present at startup.
///
/// Probes ids `0, 1, 2, ...` and stops at the first id for which `present`
/// returns `false`, or once `limit` (capped at [`MAX_SLOTS`]) ids are taken.
pub fn assign_slots<F>(limit: usize, mut present: F) -> Vec<u8, MAX_SLOTS>
where
    F: FnMut(u8) -> bool,
{
    let mut ids = Vec::new();
    for id in 0..limit.min(MAX_SLOTS) as u8 {
        if !present(id) || ids.push(id).is_err() {
            break;
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::register::RegisterFile;
    use portable_atomic::AtomicU32;
    use proptest::prelude::*;

    fn registers() -> RegisterFile<[AtomicU32; 16]> {
        RegisterFile::new(Default::default())
    }

    #[test]
    fn test_axis_negative_x_slot0() {
        let regs = registers();
        let mut slot = JoystickSlot::new(0);
        let write = slot.apply(&JsEvent::axis(0, -100), &regs).unwrap();

        assert_eq!(slot.axes()[0].x, -100);
        assert_eq!(
            write,
            Some(RegisterWrite {
                offset: 120,
                width: 2,
                value: 0b10
            })
        );
        assert_eq!(regs.read_bits(120, 2), Ok(0b10));
    }

    #[test]
    fn test_button_press_slot1() {
        let regs = registers();
        regs.write_bits(127, 1, 1).unwrap();
        let mut slot = JoystickSlot::new(1);
        slot.apply(&JsEvent::button(2, true), &regs).unwrap();
        assert_eq!(regs.read_bits(127, 1), Ok(0));

        slot.apply(&JsEvent::button(2, false), &regs).unwrap();
        assert_eq!(regs.read_bits(127, 1), Ok(1));
    }

    #[test]
    fn test_odd_axis_updates_y() {
        let regs = registers();
        let mut slot = JoystickSlot::new(0);
        slot.apply(&JsEvent::axis(3, 500), &regs).unwrap();
        assert_eq!(slot.axes()[1], AxisState { x: 0, y: 500 });
        assert_eq!(regs.read_bits(118, 2), Ok(0b01));
        assert_eq!(regs.read_bits(120, 2), Ok(0b00));
    }

    #[test]
    fn test_axis_return_to_center() {
        let regs = registers();
        let mut slot = JoystickSlot::new(2);
        let x = slot.layout().x_axis;
        slot.apply(&JsEvent::axis(4, 32767), &regs).unwrap();
        assert_eq!(regs.read_bits(x, 2), Ok(0b01));
        slot.apply(&JsEvent::axis(4, 0), &regs).unwrap();
        assert_eq!(regs.read_bits(x, 2), Ok(0b11));
    }

    #[test]
    fn test_high_axis_ignored() {
        let regs = registers();
        let mut slot = JoystickSlot::new(0);
        assert_eq!(slot.apply(&JsEvent::axis(6, -1), &regs), Ok(None));
        assert_eq!(slot.axes(), &[AxisState::default(); AXIS_COUNT]);
    }

    #[test]
    fn test_init_events_ignored() {
        let mut slot = JoystickSlot::new(0);
        let init = JsEvent {
            kind: 0x82,
            ..JsEvent::axis(0, -5)
        };
        assert_eq!(slot.translate(&init), None);
        assert_eq!(slot.axes()[0].x, 0);
    }

    #[test]
    fn test_assign_slots_stops_at_gap() {
        let present = [true, true, false, true];
        let ids = assign_slots(8, |id| present.get(usize::from(id)).copied().unwrap_or(false));
        assert_eq!(ids.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_assign_slots_capped() {
        assert_eq!(assign_slots(2, |_| true).as_slice(), &[0, 1]);
        assert_eq!(assign_slots(64, |_| true).len(), MAX_SLOTS);
        assert!(assign_slots(4, |_| false).is_empty());
    }

    proptest! {
        #[test]
        fn property_button_bit_is_inverted(value in any::<i16>(), slot in 0..MAX_SLOTS as u8) {
            let regs = registers();
            let mut s = JoystickSlot::new(slot);
            s.apply(&JsEvent::button(0, false), &regs).unwrap();
            s.apply(&JsEvent { value, ..JsEvent::button(0, false) }, &regs).unwrap();
            let expected = u32::from(value == 0);
            prop_assert_eq!(regs.read_bits(s.layout().button, 1).unwrap(), expected);
        }

        #[test]
        fn property_direction_tracks_latest_value(
            values in proptest::collection::vec(any::<i16>(), 1..32)
        ) {
            let regs = registers();
            let mut s = JoystickSlot::new(0);
            for &v in &values {
                let write = s.apply(&JsEvent::axis(0, v), &regs).unwrap();
                prop_assert_eq!(write.map(|w| w.value), Some(DirectionCode::from_axis(v).bits()));
            }
            let last = *values.last().unwrap();
            prop_assert_eq!(s.axes()[0].x, last);
            prop_assert_eq!(
                DirectionCode::from_bits(regs.read_bits(120, 2).unwrap()),
                DirectionCode::from_axis(last)
            );
        }
    }
}
