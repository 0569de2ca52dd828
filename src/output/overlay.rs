//! The on-screen-display device mapped from its UIO node.

use crate::error::MapError;
use crate::uio::UioMapping;
use std::path::Path;
use zest_core::OsdController;
use zest_proto::osd::REGION_SIZE;

/// Overlay controller backed by the mapped device.
pub type Overlay = OsdController<UioMapping>;

/// Map the overlay device at `path` into `overlay` unless already mapped.
///
/// On failure the overlay stays unmapped and every overlay call is ignored.
pub fn open_overlay(overlay: &mut Overlay, path: impl AsRef<Path>) -> Result<(), MapError> {
    overlay
        .init(|| UioMapping::open(path, REGION_SIZE).and_then(|m| m.require(REGION_SIZE)))
        .inspect_err(|e| log::error!("overlay unavailable: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zest_proto::TextCell;

    #[test]
    fn test_open_overlay_and_draw() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; REGION_SIZE]).unwrap();

        let mut overlay = Overlay::new();
        open_overlay(&mut overlay, file.path()).unwrap();
        // second call keeps the first mapping
        open_overlay(&mut overlay, "/nonexistent/uio1").unwrap();

        overlay.set_size(40, 20).unwrap();
        overlay.set_position(16, 8);
        overlay.clear(1);
        overlay.write_text("zeST", 0, 0, 7, 1).unwrap();
        overlay.show();
        assert_eq!(overlay.cell(3, 0), Some(TextCell::new(b'T', 7, 1)));
        assert_eq!(overlay.cell(4, 0), Some(TextCell::blank(1)));
        assert!(overlay.is_visible());
    }

    #[test]
    fn test_unmapped_overlay_ignores_calls() {
        let mut overlay = Overlay::new();
        assert!(open_overlay(&mut overlay, "/nonexistent/uio1").is_err());
        assert!(!overlay.is_mapped());
        overlay.show();
        assert_eq!(overlay.set_size(40, 20), Ok(()));
        assert_eq!(overlay.cell(0, 0), None);
    }
}
