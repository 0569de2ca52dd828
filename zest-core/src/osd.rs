//! On-screen-display controller.
//!
//! [`OsdController`] owns the overlay region once it has been mapped and
//! keeps the encoding rules of [`zest_proto::osd`] in one place. Every
//! operation on a controller that was never mapped does nothing.

use core::fmt;
use log::{debug, warn};
use zest_proto::osd::{
    palette_row_bytes, palette_row_offset, text_cell_offset, CONTROL_OFFSET, PALETTE_ROW_BYTES,
    REGION_SIZE, SHOW_BIT, XCHARS_OFFSET, XPOS_OFFSET, YCHARS_OFFSET, YPOS_OFFSET,
};
use zest_proto::{PaletteRow, Sprite, TextCell, MAX_SCANLINES, MAX_TEXT_CELLS, SPRITE_COUNT};

/// Byte-addressed access to an overlay register region.
///
/// Offsets are always in bounds and naturally aligned when called from
/// [`OsdController`]; implementations may panic otherwise.
pub trait OsdRegion {
    fn read_u16(&self, offset: usize) -> u16;
    fn write_u16(&mut self, offset: usize, value: u16);
    fn read_u32(&self, offset: usize) -> u32;
    fn write_u32(&mut self, offset: usize, value: u32);
    fn read_bytes(&self, offset: usize, out: &mut [u8]);
    fn write_bytes(&mut self, offset: usize, bytes: &[u8]);
}

/// Plain in-memory overlay region, laid out exactly like the device.
#[derive(Clone)]
pub struct OsdBuffer {
    bytes: [u8; REGION_SIZE],
}

impl OsdBuffer {
    /// A zeroed region.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; REGION_SIZE],
        }
    }

    /// Get the raw region bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; REGION_SIZE] {
        &self.bytes
    }
}

impl Default for OsdBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OsdRegion for OsdBuffer {
    fn read_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        self.bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[offset..offset + 4]);
        u32::from_le_bytes(raw)
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn read_bytes(&self, offset: usize, out: &mut [u8]) {
        out.copy_from_slice(&self.bytes[offset..offset + out.len()]);
    }

    fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

/// Error type for overlay operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OsdError {
    /// Requested grid has more cells than the text buffer holds.
    TooLarge { requested: usize, max: usize },
    /// Text would run past the end of a row or below the last row.
    OutOfBounds { x: u16, y: u16, len: usize },
    /// Palette rows past the last scanline.
    PaletteOutOfRange { row: usize, count: usize },
    /// No such sprite.
    InvalidSprite(usize),
}

impl fmt::Display for OsdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::TooLarge { requested, max } => {
                write!(f, "requested OSD size ({requested}) is too large (max={max})")
            }
            Self::OutOfBounds { x, y, len } => {
                write!(f, "{len} cells at ({x}, {y}) do not fit the OSD grid")
            }
            Self::PaletteOutOfRange { row, count } => {
                write!(f, "{count} palette rows from row {row} exceed {MAX_SCANLINES}")
            }
            Self::InvalidSprite(index) => write!(f, "no sprite {index}"),
        }
    }
}

/// Text/sprite overlay controller.
///
/// # Lifecycle
///
/// unmapped -> mapped ([`init`]) -> sized ([`set_size`]) -> shown/hidden.
/// The region is released when the controller is dropped.
///
/// # Bounds
///
/// Text never wraps. [`write_text`] and [`put_char`] reject any write that
/// does not fit inside the current grid instead of spilling into the
/// neighbouring cells.
///
/// [`init`]: OsdController::init
/// [`set_size`]: OsdController::set_size
/// [`write_text`]: OsdController::write_text
/// [`put_char`]: OsdController::put_char
pub struct OsdController<M> {
    region: Option<M>,
    xchars: u16,
    ychars: u16,
}

impl<M> Default for OsdController<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> OsdController<M> {
    /// An unmapped controller.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            region: None,
            xchars: 0,
            ychars: 0,
        }
    }

    /// Check if the overlay device has been mapped.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        self.region.is_some()
    }

    /// Grid dimensions last accepted by [`set_size`](Self::set_size).
    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.xchars, self.ychars)
    }

    /// Get a reference to the mapped region, if any.
    pub fn region(&self) -> Option<&M> {
        self.region.as_ref()
    }
}

impl<M: OsdRegion> OsdController<M> {
    /// A controller over an already mapped region.
    #[must_use]
    pub fn with_region(region: M) -> Self {
        Self {
            region: Some(region),
            xchars: 0,
            ychars: 0,
        }
    }

    /// Map the overlay with `map` unless it is already mapped.
    ///
    /// Once a mapping succeeds, later calls return `Ok(())` without calling
    /// `map` again. A failed mapping leaves the controller unmapped so a
    /// later call may retry.
    pub fn init<F, E>(&mut self, map: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<M, E>,
    {
        if self.region.is_none() {
            self.region = Some(map()?);
            debug!("OSD mapped");
        }
        Ok(())
    }

    /// Set the grid size in characters.
    ///
    /// Grids with more than [`MAX_TEXT_CELLS`] cells are rejected and the
    /// previous size is kept.
    pub fn set_size(&mut self, xchars: u16, ychars: u16) -> Result<(), OsdError> {
        let Some(region) = self.region.as_mut() else {
            return Ok(());
        };
        let requested = usize::from(xchars) * usize::from(ychars);
        if requested > MAX_TEXT_CELLS {
            let err = OsdError::TooLarge {
                requested,
                max: MAX_TEXT_CELLS,
            };
            warn!("error: {err}");
            return Err(err);
        }
        region.write_u16(XCHARS_OFFSET, xchars);
        region.write_u16(YCHARS_OFFSET, ychars);
        self.xchars = xchars;
        self.ychars = ychars;
        Ok(())
    }

    /// Set the overlay origin in pixels.
    pub fn set_position(&mut self, xpos: u16, ypos: u16) {
        if let Some(region) = self.region.as_mut() {
            region.write_u16(XPOS_OFFSET, xpos);
            region.write_u16(YPOS_OFFSET, ypos);
        }
    }

    /// Overlay origin as stored in the device.
    pub fn position(&self) -> Option<(u16, u16)> {
        let region = self.region.as_ref()?;
        Some((region.read_u16(XPOS_OFFSET), region.read_u16(YPOS_OFFSET)))
    }

    /// Set the visibility flag. Reserved control bits are kept.
    pub fn show(&mut self) {
        self.set_visible(true);
    }

    /// Clear the visibility flag.
    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    fn set_visible(&mut self, visible: bool) {
        if let Some(region) = self.region.as_mut() {
            let control = region.read_u32(CONTROL_OFFSET);
            let control = if visible {
                control | SHOW_BIT
            } else {
                control & !SHOW_BIT
            };
            region.write_u32(CONTROL_OFFSET, control);
        }
    }

    /// Check if the overlay is shown. Always `false` when unmapped.
    pub fn is_visible(&self) -> bool {
        self.region
            .as_ref()
            .is_some_and(|r| r.read_u32(CONTROL_OFFSET) & SHOW_BIT != 0)
    }

    /// Fill the whole grid with spaces on background colour `bg`.
    pub fn clear(&mut self, bg: u8) {
        let cells = self.cell_count();
        if let Some(region) = self.region.as_mut() {
            let blank = TextCell::blank(bg).encode();
            for index in 0..cells {
                region.write_u16(text_cell_offset(index), blank);
            }
        }
    }

    /// Write `text` left to right starting at cell `(x, y)`.
    ///
    /// The whole string must fit on row `y`: `x + text.len() <= xchars` and
    /// `y < ychars`. Otherwise nothing is written.
    pub fn write_text(
        &mut self,
        text: impl AsRef<[u8]>,
        x: u16,
        y: u16,
        fg: u8,
        bg: u8,
    ) -> Result<(), OsdError> {
        let text = text.as_ref();
        let Some(start) = self.checked_index(x, y, text.len())? else {
            return Ok(());
        };
        if let Some(region) = self.region.as_mut() {
            for (i, &ch) in text.iter().enumerate() {
                region.write_u16(text_cell_offset(start + i), TextCell::new(ch, fg, bg).encode());
            }
        }
        Ok(())
    }

    /// Write one character at cell `(x, y)`.
    pub fn put_char(&mut self, ch: u8, x: u16, y: u16, fg: u8, bg: u8) -> Result<(), OsdError> {
        let Some(index) = self.checked_index(x, y, 1)? else {
            return Ok(());
        };
        if let Some(region) = self.region.as_mut() {
            region.write_u16(text_cell_offset(index), TextCell::new(ch, fg, bg).encode());
        }
        Ok(())
    }

    /// Read back the cell at `(x, y)`.
    pub fn cell(&self, x: u16, y: u16) -> Option<TextCell> {
        let region = self.region.as_ref()?;
        if x >= self.xchars || y >= self.ychars {
            return None;
        }
        let index = usize::from(y) * usize::from(self.xchars) + usize::from(x);
        Some(TextCell::decode(region.read_u16(text_cell_offset(index))))
    }

    /// Use the same eight colours on every scanline.
    pub fn set_palette_all(&mut self, colours: &PaletteRow) {
        if let Some(region) = self.region.as_mut() {
            let bytes = palette_row_bytes(colours);
            for row in 0..MAX_SCANLINES {
                region.write_bytes(palette_row_offset(row), &bytes);
            }
        }
    }

    /// Write `rows` to consecutive scanlines starting at `row`.
    pub fn set_palette(&mut self, row: usize, rows: &[PaletteRow]) -> Result<(), OsdError> {
        let Some(region) = self.region.as_mut() else {
            return Ok(());
        };
        if row.checked_add(rows.len()).is_none_or(|end| end > MAX_SCANLINES) {
            let err = OsdError::PaletteOutOfRange {
                row,
                count: rows.len(),
            };
            warn!("{err}");
            return Err(err);
        }
        for (i, colours) in rows.iter().enumerate() {
            region.write_bytes(palette_row_offset(row + i), &palette_row_bytes(colours));
        }
        Ok(())
    }

    /// Read back one palette row.
    pub fn palette_row(&self, row: usize) -> Option<PaletteRow> {
        let region = self.region.as_ref()?;
        if row >= MAX_SCANLINES {
            return None;
        }
        let mut raw = [0u8; PALETTE_ROW_BYTES];
        region.read_bytes(palette_row_offset(row), &mut raw);
        let mut colours = PaletteRow::default();
        for (rgb, chunk) in colours.iter_mut().zip(raw.chunks_exact(3)) {
            rgb.copy_from_slice(chunk);
        }
        Some(colours)
    }

    /// Program position, colour and pixels of sprite `index`.
    pub fn set_sprite(&mut self, index: usize, sprite: &Sprite) -> Result<(), OsdError> {
        let Some(region) = self.region.as_mut() else {
            return Ok(());
        };
        if index >= SPRITE_COUNT {
            return Err(OsdError::InvalidSprite(index));
        }
        let pos = Sprite::position_offset(index);
        region.write_u16(pos, sprite.x);
        region.write_u16(pos + 2, sprite.y);
        region.write_u32(Sprite::colour_offset(index), sprite.colour);
        let data = Sprite::data_offset(index);
        for (row, &mask) in sprite.pixels.iter().enumerate() {
            region.write_u16(data + row * 2, mask);
        }
        Ok(())
    }

    fn cell_count(&self) -> usize {
        usize::from(self.xchars) * usize::from(self.ychars)
    }

    /// First cell index of a `len`-cell run at `(x, y)`, `None` when unmapped.
    fn checked_index(&self, x: u16, y: u16, len: usize) -> Result<Option<usize>, OsdError> {
        if self.region.is_none() {
            return Ok(None);
        }
        if y >= self.ychars || usize::from(x) + len > usize::from(self.xchars) {
            let err = OsdError::OutOfBounds { x, y, len };
            warn!("{err}");
            return Err(err);
        }
        Ok(Some(usize::from(y) * usize::from(self.xchars) + usize::from(x)))
    }
}
