//! Memory-mapped UIO device regions.
//!
//! Both the joystick register block and the overlay are exposed by the FPGA
//! bitstream as `/dev/uioN` nodes. A [`UioMapping`] maps one of them for the
//! lifetime of the value and unmaps on drop.

use crate::error::MapError;
use memmap2::{MmapOptions, MmapRaw};
use portable_atomic::AtomicU32;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::ptr;
use zest_core::{OsdRegion, WordStore};

/// A shared, writable mapping of a device region.
pub struct UioMapping {
    map: MmapRaw,
    path: PathBuf,
}

impl UioMapping {
    /// Map the first `len` bytes of the device at `path`.
    pub fn open(path: impl AsRef<Path>, len: usize) -> Result<Self, MapError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| MapError::Open {
                path: path.clone(),
                source,
            })?;
        let map = MmapOptions::new()
            .len(len)
            .map_raw(&file)
            .map_err(|source| MapError::Map {
                path: path.clone(),
                len,
                source,
            })?;
        log::debug!("mapped {len:#x} bytes of {}", path.display());
        Ok(Self { map, path })
    }

    /// Fail unless the mapping holds at least `needed` bytes.
    pub fn require(self, needed: usize) -> Result<Self, MapError> {
        if self.map.len() < needed {
            return Err(MapError::TooSmall {
                path: self.path,
                len: self.map.len(),
                needed,
            });
        }
        Ok(self)
    }

    /// Get the device path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mapped length in bytes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }

    fn checked_ptr(&self, offset: usize, size: usize) -> *mut u8 {
        assert!(
            offset.checked_add(size).is_some_and(|end| end <= self.map.len()),
            "access at {offset:#x}+{size} outside {:#x}-byte mapping",
            self.map.len()
        );
        // SAFETY: offset + size is within the mapping, checked above.
        unsafe { self.map.as_mut_ptr().add(offset) }
    }
}

impl WordStore for UioMapping {
    fn words(&self) -> &[AtomicU32] {
        // SAFETY: the mapping is page aligned, lives as long as `self`, and
        // AtomicU32 has the layout of u32. All access goes through atomics.
        unsafe {
            std::slice::from_raw_parts(self.map.as_ptr().cast::<AtomicU32>(), self.map.len() / 4)
        }
    }
}

// Device memory is accessed with volatile operations of the field's natural
// width so the overlay hardware never sees split or merged writes.
impl OsdRegion for UioMapping {
    fn read_u16(&self, offset: usize) -> u16 {
        let p = self.checked_ptr(offset, 2).cast::<u16>();
        // SAFETY: in bounds and 2-byte aligned (mapping is page aligned, field offsets are even).
        u16::from_le(unsafe { ptr::read_volatile(p) })
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        let p = self.checked_ptr(offset, 2).cast::<u16>();
        // SAFETY: see read_u16.
        unsafe { ptr::write_volatile(p, value.to_le()) }
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let p = self.checked_ptr(offset, 4).cast::<u32>();
        // SAFETY: in bounds and 4-byte aligned.
        u32::from_le(unsafe { ptr::read_volatile(p) })
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        let p = self.checked_ptr(offset, 4).cast::<u32>();
        // SAFETY: see read_u32.
        unsafe { ptr::write_volatile(p, value.to_le()) }
    }

    fn read_bytes(&self, offset: usize, out: &mut [u8]) {
        let p = self.checked_ptr(offset, out.len());
        for (i, byte) in out.iter_mut().enumerate() {
            // SAFETY: p + i stays inside the checked range.
            *byte = unsafe { ptr::read_volatile(p.add(i)) };
        }
    }

    fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        let p = self.checked_ptr(offset, bytes.len());
        for (i, &byte) in bytes.iter().enumerate() {
            // SAFETY: p + i stays inside the checked range.
            unsafe { ptr::write_volatile(p.add(i), byte) }
        }
    }
}
