//! On-screen-display register map.
//!
//! The overlay device exposes one 0x2000-byte region laid out as:
//!
//! ```text
//! 0x0000  u32          control (bit 0 = show, rest reserved)
//! 0x0004  u16          xchars
//! 0x0006  u16          ychars
//! 0x0008  u16          xpos
//! 0x000A  u16          ypos
//! 0x000C  [8][2] u16   sprite X/Y positions
//! 0x002C  [8] u32      sprite colours
//! 0x004C  u32          reserved config word
//! 0x0050  [192][8][3]  palette, one 8-colour RGB row per scanline
//! 0x1250  [8][16] u16  sprite pixel rows
//! 0x1350  [1624] u16   text cells
//! ```
//!
//! All fields are little-endian.

use static_assertions::const_assert_eq;

/// Size of the mapped overlay region.
pub const REGION_SIZE: usize = 0x2000;

/// Maximum number of displayed text cells.
pub const MAX_TEXT_CELLS: usize = 1624;

/// Number of palette rows (one per scanline, 24 character rows of 8 lines).
pub const MAX_SCANLINES: usize = 192;

/// Colours per palette row.
pub const PALETTE_COLOURS: usize = 8;

/// Number of hardware sprites.
pub const SPRITE_COUNT: usize = 8;

/// Pixel rows per sprite (each row is a 16-bit mask).
pub const SPRITE_ROWS: usize = 16;

pub const CONTROL_OFFSET: usize = 0x0000;
pub const XCHARS_OFFSET: usize = 0x0004;
pub const YCHARS_OFFSET: usize = 0x0006;
pub const XPOS_OFFSET: usize = 0x0008;
pub const YPOS_OFFSET: usize = 0x000A;
pub const SPRITE_POS_OFFSET: usize = 0x000C;
pub const SPRITE_COLOUR_OFFSET: usize = SPRITE_POS_OFFSET + SPRITE_COUNT * 4;
pub const CONFIG_OFFSET: usize = SPRITE_COLOUR_OFFSET + SPRITE_COUNT * 4;
pub const PALETTE_OFFSET: usize = CONFIG_OFFSET + 4;
pub const SPRITE_DATA_OFFSET: usize = PALETTE_OFFSET + MAX_SCANLINES * PALETTE_ROW_BYTES;
pub const TEXT_OFFSET: usize = SPRITE_DATA_OFFSET + SPRITE_COUNT * SPRITE_ROWS * 2;

/// Bytes in one palette row.
pub const PALETTE_ROW_BYTES: usize = PALETTE_COLOURS * 3;

/// Control word bit that makes the overlay visible.
pub const SHOW_BIT: u32 = 1 << 0;

const_assert_eq!(SPRITE_COLOUR_OFFSET, 0x2C);
const_assert_eq!(PALETTE_OFFSET, 0x50);
const_assert_eq!(TEXT_OFFSET + MAX_TEXT_CELLS * 2, REGION_SIZE);

/// One RGB palette entry.
pub type Rgb = [u8; 3];

/// Eight colours for one scanline.
pub type PaletteRow = [Rgb; PALETTE_COLOURS];

/// Flatten a palette row into its register byte order.
#[must_use]
pub fn palette_row_bytes(row: &PaletteRow) -> [u8; PALETTE_ROW_BYTES] {
    let mut out = [0u8; PALETTE_ROW_BYTES];
    for (chunk, rgb) in out.chunks_exact_mut(3).zip(row.iter()) {
        chunk.copy_from_slice(rgb);
    }
    out
}

/// Byte offset of a text cell.
#[inline]
#[must_use]
pub const fn text_cell_offset(index: usize) -> usize {
    TEXT_OFFSET + index * 2
}

/// Byte offset of a palette row.
#[inline]
#[must_use]
pub const fn palette_row_offset(row: usize) -> usize {
    PALETTE_OFFSET + row * PALETTE_ROW_BYTES
}

/// A character cell: 8-bit character code plus 3-bit foreground and
/// background colour indices.
///
/// Packed as `ch | fg << 8 | bg << 11`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextCell {
    pub ch: u8,
    pub fg: u8,
    pub bg: u8,
}

impl TextCell {
    /// Create a cell. Colour indices are masked to 3 bits.
    #[must_use]
    pub const fn new(ch: u8, fg: u8, bg: u8) -> Self {
        Self {
            ch,
            fg: fg & 7,
            bg: bg & 7,
        }
    }

    /// A blank cell on the given background.
    #[must_use]
    pub const fn blank(bg: u8) -> Self {
        Self::new(b' ', 0, bg)
    }

    /// Pack into the 16-bit text buffer word.
    #[inline]
    #[must_use]
    pub const fn encode(self) -> u16 {
        self.ch as u16 | ((self.fg & 7) as u16) << 8 | ((self.bg & 7) as u16) << 11
    }

    /// Unpack a text buffer word. Bits 14 and 15 are ignored.
    #[inline]
    #[must_use]
    pub const fn decode(raw: u16) -> Self {
        Self {
            ch: (raw & 0xFF) as u8,
            fg: ((raw >> 8) & 7) as u8,
            bg: ((raw >> 11) & 7) as u8,
        }
    }
}

/// A 16x16 monochrome sprite.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sprite {
    pub x: u16,
    pub y: u16,
    /// Raw colour word as consumed by the overlay hardware.
    pub colour: u32,
    /// One 16-bit mask per pixel row, MSB leftmost.
    pub pixels: [u16; SPRITE_ROWS],
}

impl Sprite {
    /// Byte offset of this sprite's position pair.
    #[must_use]
    pub const fn position_offset(index: usize) -> usize {
        SPRITE_POS_OFFSET + index * 4
    }

    /// Byte offset of this sprite's colour word.
    #[must_use]
    pub const fn colour_offset(index: usize) -> usize {
        SPRITE_COLOUR_OFFSET + index * 4
    }

    /// Byte offset of this sprite's first pixel row.
    #[must_use]
    pub const fn data_offset(index: usize) -> usize {
        SPRITE_DATA_OFFSET + index * SPRITE_ROWS * 2
    }
}
