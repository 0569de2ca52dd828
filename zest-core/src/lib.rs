//! Platform-agnostic joystick bridging and overlay control.
//!
//! This crate holds everything that can be reasoned about without a real
//! device node: the shared register file, the per-slot event translation,
//! the worker loop that drives a slot, and the overlay controller. It is
//! `no_std` and is tested on host with the `std` feature.
//!
//! # Overview
//!
//! - [`register`]: Atomic bit-addressed [`RegisterFile`] over a word store
//! - [`slot`]: [`JoystickSlot`] event translation and slot assignment
//! - [`input`]: Event source trait ([`EventSource`])
//! - [`output`]: Register sink trait ([`RegisterSink`])
//! - [`bridge`]: Per-slot worker loop ([`SlotBridge`])
//! - [`osd`]: Overlay controller ([`OsdController`]) over an [`OsdRegion`]
//!
//! # Example
//!
//! ```rust
//! use portable_atomic::AtomicU32;
//! use zest_core::{JoystickSlot, RegisterFile, RegisterSink};
//! use zest_proto::{DirectionCode, JsEvent};
//!
//! let words: [AtomicU32; 16] = Default::default();
//! let registers = RegisterFile::new(words);
//! let mut slot = JoystickSlot::new(0);
//!
//! slot.apply(&JsEvent::axis(0, -100), &registers).unwrap();
//! let bits = registers.read_bits(120, 2).unwrap();
//! assert_eq!(DirectionCode::from_bits(bits), DirectionCode::Negative);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (host testing, `Arc` sinks)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bridge;
pub mod input;
pub mod osd;
pub mod output;
pub mod register;
pub mod slot;

// Re-export main types at crate root
pub use bridge::{BridgeError, ReadFailurePolicy, Shutdown, SlotBridge, SlotExit, IDLE_WAIT};
pub use input::{EventSource, InputError};
pub use osd::{OsdBuffer, OsdController, OsdError, OsdRegion};
pub use output::{RegisterError, RegisterSink};
pub use register::{RegisterFile, WordStore};
pub use slot::{assign_slots, AxisState, JoystickSlot, RegisterWrite, AXIS_COUNT};
