//! Memory-mapped outputs: the joystick register block and the overlay.

pub mod overlay;
pub mod registers;

pub use overlay::{open_overlay, Overlay};
pub use registers::{map_registers, MappedRegisters, REGISTER_MAP_SIZE};
