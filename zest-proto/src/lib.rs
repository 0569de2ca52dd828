//! Wire formats and memory layouts shared by the zeST peripheral bridge.
//!
//! This crate describes *what the bytes look like*, without touching any
//! device:
//!
//! - **Events**: the Linux joystick interface record
//!   - [`JsEvent`] - one decoded 8-byte `js_event`
//!   - [`JsEventKind`] - button, axis or synthetic-init classification
//!
//! - **Register layout**: where each joystick slot lives in the shared
//!   register block polled by the FPGA core
//!   - [`SlotLayout`] - button, X and Y bit offsets for one slot
//!   - [`DirectionCode`] - the 2-bit sign encoding of an axis
//!
//! - **Overlay layout**: the on-screen-display register map
//!   - [`osd`] - field offsets, capacities and region size
//!   - [`TextCell`] - packed character/foreground/background cell
//!   - [`Sprite`], [`PaletteRow`]
//!
//! # Register Layout
//!
//! Joystick state starts at word 4 of the register block. Offsets in this
//! crate are *relative* to that word, so the absolute bit is
//! `128 + relative`:
//!
//! ```text
//! Y axis   2 bits  at 118 + 5 * slot
//! X axis   2 bits  at 120 + 5 * slot
//! button   1 bit   at 122 + 5 * slot   (0 = pressed)
//! ```
//!
//! # Example
//!
//! ```
//! use zest_proto::{DirectionCode, SlotLayout};
//!
//! let slot1 = SlotLayout::for_slot(1);
//! assert_eq!(slot1.button, 127);
//! assert_eq!(DirectionCode::from_axis(-100), DirectionCode::Negative);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod event;
pub mod layout;
pub mod osd;

pub use event::{JsEvent, JsEventKind, JS_EVENT_SIZE};
pub use layout::{
    DirectionCode, SlotLayout, AXIS_WIDTH, BUTTON_WIDTH, JOYSTICK_BASE_WORD, MAX_SLOTS, SLOT_STRIDE,
};
pub use osd::{PaletteRow, Rgb, Sprite, TextCell, MAX_SCANLINES, MAX_TEXT_CELLS, SPRITE_COUNT};
