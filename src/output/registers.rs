//! The joystick register block mapped from its UIO node.

use crate::error::MapError;
use crate::uio::UioMapping;
use std::path::Path;
use zest_core::RegisterFile;
use zest_proto::{SlotLayout, JOYSTICK_BASE_WORD};

/// Bytes mapped for the register block (one page).
pub const REGISTER_MAP_SIZE: usize = 0x1000;

/// Register file backed by the mapped device.
pub type MappedRegisters = RegisterFile<UioMapping>;

/// Map the register block at `path`.
///
/// Failure here leaves joystick input with nowhere to go; callers treat it
/// as fatal.
pub fn map_registers(path: impl AsRef<Path>) -> Result<MappedRegisters, MapError> {
    let needed = (JOYSTICK_BASE_WORD + SlotLayout::end_of_layout().div_ceil(32) as usize) * 4;
    let mapping = UioMapping::open(path, REGISTER_MAP_SIZE)
        .and_then(|m| m.require(needed))
        .inspect_err(|e| log::error!("register block unavailable: {e}"))?;
    Ok(RegisterFile::new(mapping))
}
