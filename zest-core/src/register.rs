//! Bit-addressed view of the shared register block.
//!
//! The FPGA core polls a block of 32-bit words. Several joystick workers
//! write to it at once, and fields of neighbouring slots can share a word,
//! so every write is a compare-and-swap loop on the whole word rather than a
//! plain load/modify/store.

use crate::output::{RegisterError, RegisterSink};
use core::sync::atomic::Ordering;
use portable_atomic::AtomicU32;
use zest_proto::JOYSTICK_BASE_WORD;

/// Backing storage of a register file.
///
/// Implemented for in-memory word arrays here and for memory-mapped device
/// regions by the platform layer.
pub trait WordStore {
    /// The full word array, starting at word 0 of the block.
    fn words(&self) -> &[AtomicU32];
}

impl<const N: usize> WordStore for [AtomicU32; N] {
    fn words(&self) -> &[AtomicU32] {
        self
    }
}

impl WordStore for &[AtomicU32] {
    fn words(&self) -> &[AtomicU32] {
        self
    }
}

#[cfg(any(feature = "std", test))]
impl WordStore for std::vec::Vec<AtomicU32> {
    fn words(&self) -> &[AtomicU32] {
        self
    }
}

/// Register block addressed by bit offsets relative to a base word.
pub struct RegisterFile<S> {
    store: S,
    base_word: usize,
}

impl<S: WordStore> RegisterFile<S> {
    /// Wrap a store with the joystick base word (word 4).
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self::with_base(store, JOYSTICK_BASE_WORD)
    }

    /// Wrap a store with an explicit base word.
    #[must_use]
    pub const fn with_base(store: S, base_word: usize) -> Self {
        Self { store, base_word }
    }

    /// Word index that relative bit 0 falls into.
    #[inline]
    #[must_use]
    pub const fn base_word(&self) -> usize {
        self.base_word
    }

    /// Raw word by absolute index, for diagnostics.
    #[must_use]
    pub fn word(&self, index: usize) -> Option<u32> {
        self.store.words().get(index).map(|w| w.load(Ordering::Acquire))
    }

    /// Get a reference to the word store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the register file and return its word store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Resolve a field to its word, shift and in-word mask.
    fn locate(&self, offset: u32, width: u32) -> Result<(&AtomicU32, u32, u32), RegisterError> {
        if width == 0 || width > 32 {
            return Err(RegisterError::InvalidWidth(width));
        }
        let shift = offset % 32;
        if shift + width > 32 {
            return Err(RegisterError::StraddlesWord { offset, width });
        }
        let index = self.base_word + (offset / 32) as usize;
        let word = self
            .store
            .words()
            .get(index)
            .ok_or(RegisterError::OutOfRange { offset, width })?;
        let mask = if width == 32 {
            u32::MAX
        } else {
            ((1u32 << width) - 1) << shift
        };
        Ok((word, shift, mask))
    }
}

impl<S: WordStore> RegisterSink for RegisterFile<S> {
    fn write_bits(&self, offset: u32, width: u32, value: u32) -> Result<(), RegisterError> {
        let (word, shift, mask) = self.locate(offset, width)?;
        let field = (value << shift) & mask;

        let mut current = word.load(Ordering::Relaxed);
        loop {
            let next = (current & !mask) | field;
            match word.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    fn read_bits(&self, offset: u32, width: u32) -> Result<u32, RegisterError> {
        let (word, shift, mask) = self.locate(offset, width)?;
        Ok((word.load(Ordering::Acquire) & mask) >> shift)
    }
}

#[cfg(any(feature = "std", test))]
impl RegisterFile<std::vec::Vec<AtomicU32>> {
    /// A zeroed in-memory register block of `words` words.
    #[must_use]
    pub fn in_memory(words: usize) -> Self {
        Self::new((0..words).map(|_| AtomicU32::new(0)).collect())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;
    use zest_proto::{SlotLayout, MAX_SLOTS};

    fn zeroed(words: usize) -> RegisterFile<Vec<AtomicU32>> {
        RegisterFile::new((0..words).map(|_| AtomicU32::new(0)).collect())
    }

    #[test]
    fn test_in_memory_is_zeroed() {
        let regs = RegisterFile::in_memory(9);
        assert_eq!(regs.store().len(), 9);
        assert!((0..9).all(|i| regs.word(i) == Some(0)));
        assert_eq!(regs.word(9), None);
        regs.write_bits(SlotLayout::end_of_layout() - 1, 1, 1).unwrap();
        assert_eq!(regs.word(8), Some(1 << 19));
    }

    #[test]
    fn test_write_lands_in_absolute_bit() {
        let regs = zeroed(16);
        // relative 122 -> absolute 250 -> word 7, bit 26
        regs.write_bits(122, 1, 1).unwrap();
        assert_eq!(regs.word(7), Some(1 << 26));
    }

    #[test]
    fn test_write_preserves_neighbours() {
        let regs = zeroed(16);
        regs.write_bits(120, 2, 0b10).unwrap();
        regs.write_bits(118, 2, 0b11).unwrap();
        assert_eq!(regs.read_bits(120, 2), Ok(0b10));
        assert_eq!(regs.read_bits(118, 2), Ok(0b11));
    }

    #[test]
    fn test_value_is_truncated_to_width() {
        let regs = zeroed(16);
        regs.write_bits(122, 1, 0xFFFF_FFFE).unwrap();
        assert_eq!(regs.word(7), Some(0));
        assert_eq!(regs.read_bits(123, 2), Ok(0));
    }

    #[test]
    fn test_rejects_bad_fields() {
        let regs = zeroed(9);
        assert_eq!(regs.write_bits(0, 0, 1), Err(RegisterError::InvalidWidth(0)));
        assert_eq!(regs.write_bits(0, 33, 1), Err(RegisterError::InvalidWidth(33)));
        assert_eq!(
            regs.write_bits(31, 2, 1),
            Err(RegisterError::StraddlesWord { offset: 31, width: 2 })
        );
        assert_eq!(
            regs.write_bits(160, 1, 1),
            Err(RegisterError::OutOfRange { offset: 160, width: 1 })
        );
        assert!(regs.write_bits(159, 1, 1).is_ok());
    }

    #[test]
    fn test_full_word_field() {
        let regs = zeroed(8);
        regs.write_bits(32, 32, 0xDEAD_BEEF).unwrap();
        assert_eq!(regs.word(5), Some(0xDEAD_BEEF));
        assert_eq!(regs.read_bits(32, 32), Ok(0xDEAD_BEEF));
    }

    #[test]
    fn test_concurrent_writers_sharing_a_word() {
        // slots 0 and 1 both own bits in word 7
        let regs = Arc::new(zeroed(16));
        let handles: Vec<_> = (0..2u8)
            .map(|slot| {
                let regs = Arc::clone(&regs);
                thread::spawn(move || {
                    let layout = SlotLayout::for_slot(slot);
                    for i in 0..10_000u32 {
                        regs.write_bits(layout.x_axis, 2, 1 + i % 3).unwrap();
                        regs.write_bits(layout.button, 1, i % 2).unwrap();
                    }
                    regs.write_bits(layout.x_axis, 2, 0b01 + u32::from(slot)).unwrap();
                    regs.write_bits(layout.button, 1, 1).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        for slot in 0..2u8 {
            let layout = SlotLayout::for_slot(slot);
            assert_eq!(regs.read_bits(layout.x_axis, 2), Ok(0b01 + u32::from(slot)));
            assert_eq!(regs.read_bits(layout.button, 1), Ok(1));
        }
    }

    proptest! {
        #[test]
        fn property_write_never_touches_other_bits(
            initial in proptest::collection::vec(any::<u32>(), 16),
            offset in 0u32..(12 * 32),
            width in 1u32..=2,
            value in any::<u32>(),
        ) {
            prop_assume!(offset % 32 + width <= 32);
            let regs = RegisterFile::new(
                initial.iter().map(|&w| AtomicU32::new(w)).collect::<Vec<_>>(),
            );
            regs.write_bits(offset, width, value).unwrap();

            for bit in 0..(12 * 32) {
                let now = regs.read_bits(bit, 1).unwrap();
                if bit >= offset && bit < offset + width {
                    prop_assert_eq!(now, (value >> (bit - offset)) & 1);
                } else {
                    let word = initial[4 + (bit / 32) as usize];
                    prop_assert_eq!(now, (word >> (bit % 32)) & 1);
                }
            }
        }

        #[test]
        fn property_slot_fields_disjoint(a in 0..MAX_SLOTS as u8, b in 0..MAX_SLOTS as u8) {
            prop_assume!(a != b);
            for (oa, wa) in SlotLayout::for_slot(a).fields() {
                for (ob, wb) in SlotLayout::for_slot(b).fields() {
                    prop_assert!(oa + wa <= ob || ob + wb <= oa);
                }
            }
        }
    }
}
